//! Account service
//!
//! Business logic for account management: creation, hierarchy links,
//! display flags, deletion and balance summaries.

use crate::audit::{generate_diff, EntityType};
use crate::error::{LedgerError, LedgerResult};
use crate::export::AccountNameResolver;
use crate::models::{Account, AccountType, CurrencyCode, Money};
use crate::storage::Storage;

/// Attempts at generating a uid that is not already taken
const MAX_UID_ATTEMPTS: usize = 8;

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new account
#[derive(Debug, Clone, Default)]
pub struct CreateAccountInput {
    pub name: String,
    pub account_type: AccountType,
    /// Falls back to the default currency when unset
    pub currency: Option<CurrencyCode>,
    pub parent_uid: Option<String>,
    pub default_transfer_account_uid: Option<String>,
    pub placeholder: bool,
    pub color_code: Option<String>,
    pub favorite: bool,
}

/// Summary of an account with computed fields
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub account: Account,
    /// Parent chain joined with `:`
    pub qualified_name: String,
    pub balance: Money,
    pub transaction_count: usize,
    pub unexported_count: usize,
}

impl<'a> AccountService<'a> {
    /// Create a new account service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account
    pub fn create(&self, input: CreateAccountInput) -> LedgerResult<Account> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation(
                "Account name cannot be empty".into(),
            ));
        }

        if let Some(parent_uid) = &input.parent_uid {
            self.require(parent_uid)?;
        }
        if self.sibling_name_taken(name, input.parent_uid.as_deref(), None)? {
            return Err(LedgerError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        if let Some(transfer_uid) = &input.default_transfer_account_uid {
            self.require(transfer_uid)?;
        }

        let mut account =
            Account::with_currency(name, input.currency.unwrap_or_default());
        account.set_account_type(input.account_type);
        account.set_parent_uid(input.parent_uid);
        account.set_default_transfer_account_uid(input.default_transfer_account_uid);
        account.set_placeholder(input.placeholder);
        account.set_color_code(input.color_code.as_deref())?;
        account.set_favorite(input.favorite);
        self.assign_unique_uid(&mut account)?;

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;

        self.storage.log_create(
            EntityType::Account,
            account.uid(),
            Some(account.name().to_string()),
            &account,
        )?;
        tracing::info!("Created account {} ({})", account.name(), account.uid());

        Ok(account)
    }

    fn assign_unique_uid(&self, account: &mut Account) -> LedgerResult<()> {
        for _ in 0..MAX_UID_ATTEMPTS {
            if !self.storage.accounts.exists(account.uid())? {
                return Ok(());
            }
            tracing::debug!("Uid {} already taken, regenerating", account.uid());
            account.regenerate_uid();
        }
        Err(LedgerError::Duplicate {
            entity_type: "Account",
            identifier: account.uid().to_string(),
        })
    }

    fn sibling_name_taken(
        &self,
        name: &str,
        parent_uid: Option<&str>,
        exclude_uid: Option<&str>,
    ) -> LedgerResult<bool> {
        let name_lower = name.to_lowercase();
        Ok(self.storage.accounts.get_all()?.iter().any(|a| {
            a.parent_uid() == parent_uid
                && a.name().to_lowercase() == name_lower
                && Some(a.uid()) != exclude_uid
        }))
    }

    fn require(&self, uid: &str) -> LedgerResult<Account> {
        self.storage
            .accounts
            .get(uid)?
            .ok_or_else(|| LedgerError::account_not_found(uid))
    }

    /// Get an account by uid
    pub fn get(&self, uid: &str) -> LedgerResult<Option<Account>> {
        self.storage.accounts.get(uid)
    }

    /// Find an account by uid, then by name (case-insensitive)
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Account>> {
        if let Some(account) = self.storage.accounts.get(identifier)? {
            return Ok(Some(account));
        }
        self.storage.accounts.get_by_name(identifier)
    }

    /// Like `find`, failing with `NotFound` when nothing matches
    pub fn resolve(&self, identifier: &str) -> LedgerResult<Account> {
        self.find(identifier)?
            .ok_or_else(|| LedgerError::account_not_found(identifier))
    }

    /// All accounts sorted by name
    pub fn list(&self) -> LedgerResult<Vec<Account>> {
        self.storage.accounts.get_all()
    }

    /// An account with its transactions attached
    pub fn load(&self, uid: &str) -> LedgerResult<Account> {
        self.storage.load_account(uid)
    }

    /// Apply `change` to a stored account, persist it and audit the diff
    fn update_with<F>(&self, uid: &str, change: F) -> LedgerResult<Account>
    where
        F: FnOnce(&mut Account) -> LedgerResult<()>,
    {
        let mut account = self.require(uid)?;
        let before = account.clone();

        change(&mut account)?;

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;

        let diff = generate_diff(
            &serde_json::to_value(&before)?,
            &serde_json::to_value(&account)?,
        );
        self.storage.log_update(
            EntityType::Account,
            account.uid(),
            Some(account.name().to_string()),
            &before,
            &account,
            diff,
        )?;

        Ok(account)
    }

    /// Rename an account
    pub fn rename(&self, uid: &str, name: &str) -> LedgerResult<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation(
                "Account name cannot be empty".into(),
            ));
        }
        let current = self.require(uid)?;
        if self.sibling_name_taken(name, current.parent_uid(), Some(uid))? {
            return Err(LedgerError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        self.update_with(uid, |account| account.try_set_name(Some(name)))
    }

    /// Change the account type
    pub fn set_account_type(&self, uid: &str, account_type: AccountType) -> LedgerResult<Account> {
        self.update_with(uid, |account| {
            account.set_account_type(account_type);
            Ok(())
        })
    }

    /// Set the color code; invalid codes leave the account untouched
    pub fn set_color(&self, uid: &str, color_code: &str) -> LedgerResult<Account> {
        self.update_with(uid, |account| account.set_color_code(Some(color_code)))
    }

    pub fn set_favorite(&self, uid: &str, favorite: bool) -> LedgerResult<Account> {
        self.update_with(uid, |account| {
            account.set_favorite(favorite);
            Ok(())
        })
    }

    pub fn set_placeholder(&self, uid: &str, placeholder: bool) -> LedgerResult<Account> {
        self.update_with(uid, |account| {
            account.set_placeholder(placeholder);
            Ok(())
        })
    }

    /// Move an account under a new parent (or to the top level)
    ///
    /// Fails when the new parent is the account itself or one of its
    /// descendants.
    pub fn set_parent(&self, uid: &str, parent_uid: Option<&str>) -> LedgerResult<Account> {
        if let Some(parent_uid) = parent_uid {
            self.require(parent_uid)?;
            if self.storage.accounts.is_ancestor_or_self(uid, parent_uid)? {
                return Err(LedgerError::Validation(format!(
                    "Account {} cannot be moved under its own descendant {}",
                    uid, parent_uid
                )));
            }
        }

        self.update_with(uid, |account| {
            account.set_parent_uid(parent_uid.map(str::to_string));
            Ok(())
        })
    }

    /// Set (or clear) the default transfer account
    pub fn set_default_transfer(
        &self,
        uid: &str,
        transfer_uid: Option<&str>,
    ) -> LedgerResult<Account> {
        if let Some(transfer_uid) = transfer_uid {
            if transfer_uid == uid {
                return Err(LedgerError::Validation(
                    "An account cannot transfer to itself".into(),
                ));
            }
            self.require(transfer_uid)?;
        }

        self.update_with(uid, |account| {
            account.set_default_transfer_account_uid(transfer_uid.map(str::to_string));
            Ok(())
        })
    }

    /// Delete an account that has no sub-accounts and no transactions
    pub fn delete(&self, uid: &str) -> LedgerResult<Account> {
        let account = self.require(uid)?;

        let children = self.storage.accounts.children_of(uid)?;
        if !children.is_empty() {
            return Err(LedgerError::Validation(format!(
                "Account '{}' has {} sub-account(s)",
                account.name(),
                children.len()
            )));
        }

        let referencing = self.storage.transactions.get_for_account(uid)?.len();
        if referencing > 0 {
            return Err(LedgerError::Validation(format!(
                "Account '{}' is referenced by {} transaction(s)",
                account.name(),
                referencing
            )));
        }

        self.storage.accounts.delete(uid)?;
        self.storage.accounts.save()?;

        self.storage.log_delete(
            EntityType::Account,
            uid,
            Some(account.name().to_string()),
            &account,
        )?;
        tracing::info!("Deleted account {} ({})", account.name(), uid);

        Ok(account)
    }

    /// Summary of one account
    pub fn summary(&self, uid: &str) -> LedgerResult<AccountSummary> {
        let account = self.storage.load_account(uid)?;
        let qualified_name = self.storage.accounts.fully_qualified_name(uid)?;
        let unexported_count = account.transactions().iter().filter(|t| !t.exported).count();
        let balance = account.balance()?;

        Ok(AccountSummary {
            qualified_name,
            balance,
            transaction_count: account.transaction_count(),
            unexported_count,
            account,
        })
    }

    /// Summaries of all accounts, ordered by qualified name
    pub fn list_with_balances(&self) -> LedgerResult<Vec<AccountSummary>> {
        let mut summaries = self
            .list()?
            .iter()
            .map(|account| self.summary(account.uid()))
            .collect::<LedgerResult<Vec<_>>>()?;
        summaries.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        Ok(summaries)
    }
}
