//! Account model
//!
//! An account is a named container of transactions in a single currency.
//! Parent and default-transfer links are plain uid references resolved by the
//! storage layer, so accounts never own each other.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::account_type::AccountType;
use super::currency::CurrencyCode;
use super::money::Money;
use super::transaction::Transaction;
use crate::error::{LedgerError, LedgerResult};

/// Length of generated account uids (the OFX `ACCTID` limit)
pub const UID_LENGTH: usize = 22;

/// Maximum number of name characters used as a uid prefix
const UID_NAME_PREFIX_LENGTH: usize = 10;

/// Check a color code against `^#(?:[0-9a-fA-F]{3}){1,2}$`
pub fn is_valid_color_code(code: &str) -> bool {
    match code.strip_prefix('#') {
        Some(hex) => {
            (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// A ledger account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    uid: String,

    name: String,

    #[serde(default)]
    currency: CurrencyCode,

    #[serde(rename = "type", default)]
    account_type: AccountType,

    /// Loaded separately by the storage layer
    #[serde(skip)]
    transactions: Vec<Transaction>,

    #[serde(default)]
    parent_uid: Option<String>,

    #[serde(default)]
    default_transfer_account_uid: Option<String>,

    #[serde(default)]
    placeholder: bool,

    #[serde(default)]
    color_code: Option<String>,

    #[serde(default)]
    favorite: bool,
}

impl Account {
    /// Create a new account in the default currency
    pub fn new(name: impl AsRef<str>) -> Self {
        Self::with_currency(name, CurrencyCode::default())
    }

    /// Create a new account in the given currency
    pub fn with_currency(name: impl AsRef<str>, currency: CurrencyCode) -> Self {
        let mut account = Self {
            uid: String::new(),
            name: name.as_ref().trim().to_string(),
            currency,
            account_type: AccountType::default(),
            transactions: Vec::new(),
            parent_uid: None,
            default_transfer_account_uid: None,
            placeholder: false,
            color_code: None,
            favorite: false,
        };
        account.uid = account.generate_uid();
        account
    }

    /// Generate a uid from the account name and a random UUID
    ///
    /// Up to 10 lowercase alphanumerics of the name prefix hex digits of a
    /// UUID, for 22 characters in total. Without a usable name the uid is the
    /// first 22 characters of a hyphenated UUID.
    pub fn generate_uid(&self) -> String {
        let uuid = Uuid::new_v4();
        let prefix: String = self
            .name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(UID_NAME_PREFIX_LENGTH)
            .collect::<String>()
            .to_ascii_lowercase();

        if prefix.is_empty() {
            return uuid.hyphenated().to_string()[..UID_LENGTH].to_string();
        }

        let suffix = uuid.simple().to_string();
        format!("{}{}", prefix, &suffix[..UID_LENGTH - prefix.len()])
    }

    /// Replace the uid with a freshly generated one
    pub fn regenerate_uid(&mut self) {
        self.uid = self.generate_uid();
    }

    /// Unique identifier
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Override the uid (used when loading a pre-identified account)
    pub fn set_uid(&mut self, uid: impl Into<String>) {
        self.uid = uid.into();
    }

    /// Account name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the name, trimming surrounding whitespace
    pub fn set_name(&mut self, name: impl AsRef<str>) {
        self.name = name.as_ref().trim().to_string();
    }

    /// Set the name from an optional input, rejecting a missing value
    pub fn try_set_name(&mut self, name: Option<&str>) -> LedgerResult<()> {
        let name = name.ok_or_else(|| {
            LedgerError::InvalidArgument("Account name is required".into())
        })?;
        self.set_name(name);
        Ok(())
    }

    /// Currency of this account
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Change the currency of the account.
    ///
    /// Existing transactions are not converted; they are rebound only when
    /// passed through `add_transaction` or `set_transactions` again.
    pub fn set_currency(&mut self, currency: CurrencyCode) {
        self.currency = currency;
    }

    /// Type of account
    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    /// Set the type of account
    pub fn set_account_type(&mut self, account_type: AccountType) {
        self.account_type = account_type;
    }

    /// Uid of the parent account, if any
    pub fn parent_uid(&self) -> Option<&str> {
        self.parent_uid.as_deref()
    }

    /// Set the parent account reference
    pub fn set_parent_uid(&mut self, parent_uid: Option<String>) {
        self.parent_uid = parent_uid;
    }

    /// Uid of the account transfers go to by default
    pub fn default_transfer_account_uid(&self) -> Option<&str> {
        self.default_transfer_account_uid.as_deref()
    }

    /// Set the default transfer account reference
    pub fn set_default_transfer_account_uid(&mut self, uid: Option<String>) {
        self.default_transfer_account_uid = uid;
    }

    /// Placeholder accounts only organize sub-accounts
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Set the placeholder flag
    pub fn set_placeholder(&mut self, placeholder: bool) {
        self.placeholder = placeholder;
    }

    /// Color code in `#rgb` or `#rrggbb` form
    pub fn color_code(&self) -> Option<&str> {
        self.color_code.as_deref()
    }

    /// Set the color code. `None` leaves the current color in place.
    pub fn set_color_code(&mut self, code: Option<&str>) -> LedgerResult<()> {
        let Some(code) = code else {
            return Ok(());
        };
        if !is_valid_color_code(code) {
            return Err(LedgerError::InvalidFormat(format!(
                "Invalid color hex code: {}",
                code
            )));
        }
        self.color_code = Some(code.to_string());
        Ok(())
    }

    /// Whether the account is flagged as favorite
    pub fn is_favorite(&self) -> bool {
        self.favorite
    }

    /// Set the favorite flag
    pub fn set_favorite(&mut self, favorite: bool) {
        self.favorite = favorite;
    }

    /// Bind a transaction to this account: stamp the account uid when unset,
    /// always force the account currency
    fn bind(&self, transaction: &mut Transaction) {
        if transaction.account_uid.is_none() {
            transaction.account_uid = Some(self.uid.clone());
        }
        transaction.set_currency(self.currency.clone());
    }

    /// Append a transaction, returning the stored copy
    ///
    /// Transactions that already carry an account uid (the other leg of a
    /// transfer) keep it; the currency is rebound unconditionally.
    pub fn add_transaction(&mut self, mut transaction: Transaction) -> &Transaction {
        self.bind(&mut transaction);
        let index = self.transactions.len();
        self.transactions.push(transaction);
        &self.transactions[index]
    }

    /// Replace all transactions, binding each one as `add_transaction` does
    pub fn set_transactions(&mut self, mut transactions: Vec<Transaction>) {
        for transaction in &mut transactions {
            self.bind(transaction);
        }
        self.transactions = transactions;
    }

    /// Remove the first transaction equal to `transaction`
    pub fn remove_transaction(&mut self, transaction: &Transaction) -> bool {
        match self.transactions.iter().position(|t| t == transaction) {
            Some(index) => {
                self.transactions.remove(index);
                true
            }
            None => false,
        }
    }

    /// Transactions in insertion order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Number of transactions in the account
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// True if at least one transaction has not been exported yet
    pub fn has_unexported_transactions(&self) -> bool {
        self.transactions.iter().any(|t| !t.exported)
    }

    /// Aggregate of all transaction amounts in the account currency.
    ///
    /// This is a flat sum: the other legs of transfers are added as stored
    /// and sub-accounts are not considered. Fails when the sum leaves the
    /// decimal range.
    pub fn balance(&self) -> LedgerResult<Money> {
        self.transactions
            .iter()
            .try_fold(Money::zero(self.currency.clone()), |total, t| {
                total.checked_add(&t.amount)
            })
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.account_type)
    }
}
