//! Service layer for ledger-export
//!
//! Business logic on top of the storage layer: validation, audit logging and
//! the export workflow.

pub mod account;
pub mod export;
pub mod transaction;

pub use account::{AccountService, AccountSummary, CreateAccountInput};
pub use export::{ExportOutcome, ExportRequest, ExportService};
pub use transaction::{AddTransactionInput, TransactionService};
