//! Account repository for JSON storage
//!
//! Manages loading and saving accounts to accounts.json. Transactions are
//! stored separately and attached by `Storage::load_account`.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{LedgerError, LedgerResult};
use crate::export::qif::{AccountNameResolver, ACCOUNT_NAME_SEPARATOR};
use crate::models::{Account, AccountType};

use super::file_io::{read_json, write_json_atomic};

/// Serializable account data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AccountData {
    accounts: Vec<Account>,
}

fn lock_error(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Storage(format!("Failed to acquire account lock: {}", e))
}

/// Repository for account persistence, keyed by uid
pub struct AccountRepository {
    path: PathBuf,
    data: RwLock<HashMap<String, Account>>,
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load accounts from disk
    pub fn load(&self) -> LedgerResult<()> {
        let file_data: AccountData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_error)?;
        data.clear();
        for account in file_data.accounts {
            data.insert(account.uid().to_string(), account);
        }

        Ok(())
    }

    /// Save accounts to disk, ordered by uid for stable diffs
    pub fn save(&self) -> LedgerResult<()> {
        let data = self.data.read().map_err(lock_error)?;

        let mut accounts: Vec<Account> = data.values().cloned().collect();
        accounts.sort_by(|a, b| a.uid().cmp(b.uid()));

        write_json_atomic(&self.path, &AccountData { accounts })
    }

    /// Get an account by uid
    pub fn get(&self, uid: &str) -> LedgerResult<Option<Account>> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(uid).cloned())
    }

    /// Get all accounts, sorted by name
    pub fn get_all(&self) -> LedgerResult<Vec<Account>> {
        let data = self.data.read().map_err(lock_error)?;

        let mut accounts: Vec<_> = data.values().cloned().collect();
        accounts.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.uid().cmp(b.uid()))
        });
        Ok(accounts)
    }

    /// Get an account by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> LedgerResult<Option<Account>> {
        let data = self.data.read().map_err(lock_error)?;

        let name_lower = name.trim().to_lowercase();
        Ok(data
            .values()
            .find(|a| a.name().to_lowercase() == name_lower)
            .cloned())
    }

    /// Direct children of an account
    pub fn children_of(&self, uid: &str) -> LedgerResult<Vec<Account>> {
        let data = self.data.read().map_err(lock_error)?;

        let mut children: Vec<_> = data
            .values()
            .filter(|a| a.parent_uid() == Some(uid))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(children)
    }

    /// Insert or update an account
    pub fn upsert(&self, account: Account) -> LedgerResult<()> {
        let mut data = self.data.write().map_err(lock_error)?;
        data.insert(account.uid().to_string(), account);
        Ok(())
    }

    /// Delete an account
    pub fn delete(&self, uid: &str) -> LedgerResult<bool> {
        let mut data = self.data.write().map_err(lock_error)?;
        Ok(data.remove(uid).is_some())
    }

    /// Check if an account exists
    pub fn exists(&self, uid: &str) -> LedgerResult<bool> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.contains_key(uid))
    }

    /// Count accounts
    pub fn count(&self) -> LedgerResult<usize> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }

    /// Whether `ancestor_uid` appears in the parent chain of `uid` (or is `uid`)
    pub fn is_ancestor_or_self(&self, ancestor_uid: &str, uid: &str) -> LedgerResult<bool> {
        let data = self.data.read().map_err(lock_error)?;

        let mut seen = HashSet::new();
        let mut current = Some(uid.to_string());
        while let Some(current_uid) = current {
            if current_uid == ancestor_uid {
                return Ok(true);
            }
            if !seen.insert(current_uid.clone()) {
                break;
            }
            current = data
                .get(&current_uid)
                .and_then(|a| a.parent_uid().map(str::to_string));
        }
        Ok(false)
    }
}

impl AccountNameResolver for AccountRepository {
    /// Names of the parent chain joined root first; Root-type ancestors are
    /// left out
    fn fully_qualified_name(&self, account_uid: &str) -> LedgerResult<String> {
        let data = self.data.read().map_err(lock_error)?;

        let account = data
            .get(account_uid)
            .ok_or_else(|| LedgerError::account_not_found(account_uid))?;

        let mut names = vec![account.name().to_string()];
        let mut seen = HashSet::from([account_uid.to_string()]);
        let mut parent_uid = account.parent_uid();

        while let Some(uid) = parent_uid {
            if !seen.insert(uid.to_string()) {
                return Err(LedgerError::Storage(format!(
                    "Cycle in parent chain of account {}",
                    account_uid
                )));
            }
            let parent = data
                .get(uid)
                .ok_or_else(|| LedgerError::account_not_found(uid))?;
            if parent.account_type() != AccountType::Root {
                names.push(parent.name().to_string());
            }
            parent_uid = parent.parent_uid();
        }

        names.reverse();
        Ok(names.join(ACCOUNT_NAME_SEPARATOR))
    }
}
