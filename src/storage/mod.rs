//! Storage layer for ledger-export
//!
//! JSON file storage with atomic writes. Accounts and transactions live in
//! separate files; `load_account` joins them back together.

pub mod accounts;
pub mod file_io;
pub mod transactions;

pub use accounts::AccountRepository;
pub use file_io::{read_json, write_json_atomic, write_text_atomic};
pub use transactions::TransactionRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::models::Account;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub accounts: AccountRepository,
    pub transactions: TransactionRepository,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: LedgerPaths) -> LedgerResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            accounts: AccountRepository::new(paths.accounts_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> LedgerResult<()> {
        self.accounts.load()?;
        self.transactions.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> LedgerResult<()> {
        self.accounts.save()?;
        self.transactions.save()?;
        Ok(())
    }

    /// An account with its transaction collection attached: its own records
    /// plus the other legs of transfers targeting it
    pub fn load_account(&self, uid: &str) -> LedgerResult<Account> {
        let mut account = self
            .accounts
            .get(uid)?
            .ok_or_else(|| LedgerError::account_not_found(uid))?;

        let transactions = self.transactions.get_for_account(uid)?;
        account.set_transactions(transactions);
        Ok(account)
    }

    /// The audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> LedgerResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> LedgerResult<()> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> LedgerResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}
