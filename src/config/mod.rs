//! Configuration module for ledger-export
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence (default currency, export preferences)

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::{ExportFormat, Settings};
