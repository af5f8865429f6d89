//! Transaction service
//!
//! Records transactions against accounts, including transfers, and tracks
//! their export state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, Transaction};
use crate::storage::Storage;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Input for adding a transaction
#[derive(Debug, Clone)]
pub struct AddTransactionInput {
    /// Uid of the owning account
    pub account_uid: String,
    pub name: String,
    /// Signed amount in the account currency
    pub amount: Decimal,
    pub memo: Option<String>,
    /// Defaults to now
    pub time: Option<DateTime<Utc>>,
    /// Counter account; defaults to the account's default transfer account
    pub transfer_account_uid: Option<String>,
    /// Record a plain transaction even if the account has a default transfer account
    pub no_transfer: bool,
}

impl AddTransactionInput {
    pub fn new(account_uid: impl Into<String>, name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_uid: account_uid.into(),
            name: name.into(),
            amount,
            memo: None,
            time: None,
            transfer_account_uid: None,
            no_transfer: false,
        }
    }
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Add a transaction to an account
    pub fn add(&self, input: AddTransactionInput) -> LedgerResult<Transaction> {
        let mut account = self.storage.load_account(&input.account_uid)?;

        if account.is_placeholder() {
            return Err(LedgerError::Validation(format!(
                "Account '{}' is a placeholder and cannot hold transactions",
                account.name()
            )));
        }

        let transfer_uid = if input.no_transfer {
            None
        } else {
            input
                .transfer_account_uid
                .or_else(|| account.default_transfer_account_uid().map(str::to_string))
        };

        if let Some(transfer_uid) = &transfer_uid {
            if transfer_uid == account.uid() {
                return Err(LedgerError::Validation(
                    "A transfer needs two different accounts".into(),
                ));
            }
            let target = self
                .storage
                .accounts
                .get(transfer_uid)?
                .ok_or_else(|| LedgerError::account_not_found(transfer_uid.as_str()))?;
            if target.is_placeholder() {
                return Err(LedgerError::Validation(format!(
                    "Account '{}' is a placeholder and cannot hold transactions",
                    target.name()
                )));
            }
        }

        let mut txn = Transaction::new(
            input.name.trim(),
            Money::new(input.amount, account.currency().clone()),
        );
        if let Some(memo) = input.memo {
            txn = txn.with_memo(memo.trim());
        }
        if let Some(time) = input.time {
            txn = txn.at(time);
        }
        txn.transfer_account_uid = transfer_uid;

        let txn = account.add_transaction(txn).clone();

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_create(
            EntityType::Transaction,
            txn.uid.as_str(),
            Some(txn.name.clone()),
            &txn,
        )?;
        tracing::info!(
            "Added transaction {} of {} to account {}",
            txn.uid,
            txn.amount,
            account.uid()
        );

        Ok(txn)
    }

    /// Get a transaction by uid
    pub fn get(&self, uid: &str) -> LedgerResult<Option<Transaction>> {
        self.storage.transactions.get(uid)
    }

    /// Transactions of an account, including the other legs of transfers
    pub fn list_for_account(&self, account_uid: &str) -> LedgerResult<Vec<Transaction>> {
        Ok(self.storage.load_account(account_uid)?.transactions().to_vec())
    }

    /// All stored transactions in chronological order
    pub fn list(&self) -> LedgerResult<Vec<Transaction>> {
        self.storage.transactions.get_all()
    }

    /// Delete a transaction
    pub fn delete(&self, uid: &str) -> LedgerResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .delete(uid)?
            .ok_or_else(|| LedgerError::transaction_not_found(uid))?;
        self.storage.transactions.save()?;

        self.storage.log_delete(
            EntityType::Transaction,
            uid,
            Some(txn.name.clone()),
            &txn,
        )?;

        Ok(txn)
    }

    /// Flag transactions as exported and persist, returning how many changed
    pub fn mark_exported(&self, uids: &[String]) -> LedgerResult<usize> {
        let changed = self.storage.transactions.mark_exported(uids)?;
        if changed > 0 {
            self.storage.transactions.save()?;
        }
        tracing::debug!("Marked {} transaction(s) as exported", changed);
        Ok(changed)
    }
}
