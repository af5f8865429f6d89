//! CLI command handlers
//!
//! Bridges the clap argument parsing with the service layer.

pub mod account;
pub mod export;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use export::{handle_export_command, ExportArgs, FormatArg};
pub use transaction::{handle_transaction_command, TransactionCommands};
