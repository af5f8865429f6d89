//! Core data models for ledger-export
//!
//! This module contains the data structures of the ledger domain: account
//! types, accounts, transactions and currency-bound money amounts.

pub mod account;
pub mod account_type;
pub mod currency;
pub mod money;
pub mod transaction;

pub use account::{is_valid_color_code, Account, UID_LENGTH};
pub use account_type::{AccountType, NormalBalance};
pub use currency::{CurrencyCode, DEFAULT_CURRENCY_CODE};
pub use money::Money;
pub use transaction::Transaction;
