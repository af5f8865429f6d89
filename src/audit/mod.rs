//! Audit logging for ledger-export
//!
//! Records create, update, delete and export operations with before/after
//! snapshots in an append-only JSONL log (`audit.log`).
//!
//! - `AuditEntry`: one logged operation
//! - `AuditLogger`: appends entries and reads them back
//! - `generate_diff`: top-level field changes between two snapshots

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
