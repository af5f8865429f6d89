//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json, with an
//! index from account uid to the transactions that account owns.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Transaction;

use super::file_io::{read_json, write_json_atomic};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

fn lock_error(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Storage(format!("Failed to acquire transaction lock: {}", e))
}

fn sort_by_time(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.uid.cmp(&b.uid)));
}

/// Repository for transaction persistence with an owner index
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<String, Transaction>>,
    /// Index: owning account uid -> transaction uids
    by_account: RwLock<HashMap<String, Vec<String>>>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_account: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and build the index
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_account = self.by_account.write().map_err(lock_error)?;

        data.clear();
        by_account.clear();

        for txn in file_data.transactions {
            if let Some(owner) = &txn.account_uid {
                by_account
                    .entry(owner.clone())
                    .or_default()
                    .push(txn.uid.clone());
            }
            data.insert(txn.uid.clone(), txn);
        }

        Ok(())
    }

    /// Save transactions to disk in chronological order
    pub fn save(&self) -> LedgerResult<()> {
        let data = self.data.read().map_err(lock_error)?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        sort_by_time(&mut transactions);

        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    /// Get a transaction by uid
    pub fn get(&self, uid: &str) -> LedgerResult<Option<Transaction>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(uid).cloned())
    }

    /// Get all transactions in chronological order
    pub fn get_all(&self) -> LedgerResult<Vec<Transaction>> {
        let data = self.data.read().map_err(lock_error)?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        sort_by_time(&mut transactions);
        Ok(transactions)
    }

    fn owned_by(
        data: &HashMap<String, Transaction>,
        by_account: &HashMap<String, Vec<String>>,
        account_uid: &str,
    ) -> Vec<Transaction> {
        by_account
            .get(account_uid)
            .map(|uids| uids.iter().filter_map(|uid| data.get(uid).cloned()).collect())
            .unwrap_or_default()
    }

    /// Transactions that belong in an account's collection: the ones it owns
    /// plus the other legs of transfers targeting it
    pub fn get_for_account(&self, account_uid: &str) -> LedgerResult<Vec<Transaction>> {
        let data = self.data.read().map_err(lock_error)?;
        let by_account = self.by_account.read().map_err(lock_error)?;

        let mut transactions = Self::owned_by(&data, &by_account, account_uid);
        transactions.extend(
            data.values()
                .filter(|t| {
                    !t.is_owned_by(account_uid)
                        && t.transfer_account_uid.as_deref() == Some(account_uid)
                })
                .cloned(),
        );
        sort_by_time(&mut transactions);
        Ok(transactions)
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_account = self.by_account.write().map_err(lock_error)?;

        if let Some(old_owner) = data.get(&txn.uid).and_then(|old| old.account_uid.clone()) {
            if let Some(uids) = by_account.get_mut(&old_owner) {
                uids.retain(|uid| uid != &txn.uid);
            }
        }

        if let Some(owner) = &txn.account_uid {
            by_account
                .entry(owner.clone())
                .or_default()
                .push(txn.uid.clone());
        }
        data.insert(txn.uid.clone(), txn);

        Ok(())
    }

    /// Delete a transaction
    pub fn delete(&self, uid: &str) -> LedgerResult<Option<Transaction>> {
        let mut data = self.data.write().map_err(lock_error)?;
        let mut by_account = self.by_account.write().map_err(lock_error)?;

        let removed = data.remove(uid);
        if let Some(owner) = removed.as_ref().and_then(|t| t.account_uid.as_ref()) {
            if let Some(uids) = by_account.get_mut(owner) {
                uids.retain(|id| id != uid);
            }
        }
        Ok(removed)
    }

    /// Flag the given transactions as exported, returning how many changed
    pub fn mark_exported(&self, uids: &[String]) -> LedgerResult<usize> {
        let mut data = self.data.write().map_err(lock_error)?;

        let mut changed = 0;
        for uid in uids {
            if let Some(txn) = data.get_mut(uid) {
                if !txn.exported {
                    txn.mark_exported();
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// Count all transactions
    pub fn count(&self) -> LedgerResult<usize> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrencyCode, Money};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        let repo = TransactionRepository::new(path);
        (temp_dir, repo)
    }

    fn owned(owner: &str, name: &str, day: u32) -> Transaction {
        let mut txn = Transaction::new(name, Money::new(dec!(10.00), CurrencyCode::default()))
            .at(Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap());
        txn.account_uid = Some(owner.to_string());
        txn
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = owned("checking", "Coffee", 1);
        let uid = txn.uid.clone();

        repo.upsert(txn).unwrap();

        let retrieved = repo.get(&uid).unwrap().unwrap();
        assert_eq!(retrieved.name, "Coffee");
    }

    #[test]
    fn test_get_for_account_sorted() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(owned("checking", "Later", 5)).unwrap();
        repo.upsert(owned("checking", "Earlier", 2)).unwrap();
        repo.upsert(owned("savings", "Other", 3)).unwrap();

        let txns = repo.get_for_account("checking").unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].name, "Earlier");
        assert_eq!(txns[1].name, "Later");
    }

    #[test]
    fn test_get_for_account_includes_other_legs() {
        let (_temp_dir, repo) = create_test_repo();
        let mut transfer = owned("checking", "To savings", 1);
        transfer.transfer_account_uid = Some("savings".to_string());
        repo.upsert(transfer).unwrap();
        repo.upsert(owned("savings", "Interest", 2)).unwrap();

        let savings = repo.get_for_account("savings").unwrap();
        assert_eq!(savings.len(), 2);

        let checking = repo.get_for_account("checking").unwrap();
        assert_eq!(checking.len(), 1);
    }

    #[test]
    fn test_upsert_moves_index() {
        let (_temp_dir, repo) = create_test_repo();
        let mut txn = owned("checking", "Coffee", 1);
        repo.upsert(txn.clone()).unwrap();

        txn.account_uid = Some("wallet".to_string());
        repo.upsert(txn).unwrap();

        assert!(repo.get_for_account("checking").unwrap().is_empty());
        assert_eq!(repo.get_for_account("wallet").unwrap().len(), 1);
    }

    #[test]
    fn test_owner_and_counter_views_stay_in_sync() {
        let (_temp_dir, repo) = create_test_repo();
        let mut transfer = owned("checking", "To savings", 1);
        transfer.transfer_account_uid = Some("savings".to_string());
        repo.upsert(transfer.clone()).unwrap();

        transfer.account_uid = Some("wallet".to_string());
        repo.upsert(transfer.clone()).unwrap();

        assert!(repo.get_for_account("checking").unwrap().is_empty());
        assert_eq!(repo.get_for_account("wallet").unwrap().len(), 1);
        assert_eq!(repo.get_for_account("savings").unwrap().len(), 1);

        repo.delete(&transfer.uid).unwrap();
        assert!(repo.get_for_account("wallet").unwrap().is_empty());
        assert!(repo.get_for_account("savings").unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let txn = owned("checking", "Rent", 1).with_memo("January");
        let uid = txn.uid.clone();

        repo.upsert(txn).unwrap();
        repo.save().unwrap();

        let repo2 = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo2.load().unwrap();

        let loaded = repo2.get(&uid).unwrap().unwrap();
        assert_eq!(loaded.memo, "January");
        assert_eq!(loaded.amount.amount(), dec!(10.00));
        assert_eq!(repo2.get_for_account("checking").unwrap().len(), 1);
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let txn = owned("checking", "Coffee", 1);
        let uid = txn.uid.clone();
        repo.upsert(txn).unwrap();

        let removed = repo.delete(&uid).unwrap();
        assert_eq!(removed.unwrap().uid, uid);
        assert!(repo.get(&uid).unwrap().is_none());
        assert!(repo.get_for_account("checking").unwrap().is_empty());
        assert!(repo.delete(&uid).unwrap().is_none());
    }

    #[test]
    fn test_mark_exported() {
        let (_temp_dir, repo) = create_test_repo();
        let first = owned("checking", "A", 1);
        let second = owned("checking", "B", 2);
        let uids = vec![first.uid.clone(), second.uid.clone(), "missing".to_string()];
        repo.upsert(first).unwrap();
        repo.upsert(second).unwrap();

        assert_eq!(repo.mark_exported(&uids).unwrap(), 2);
        assert_eq!(repo.mark_exported(&uids).unwrap(), 0);
        assert!(repo.get_all().unwrap().iter().all(|t| t.exported));
    }
}
