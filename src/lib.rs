//! ledger-export - Ledger accounts with OFX and QIF export
//!
//! This library models a small double-entry ledger (hierarchical accounts,
//! transactions and transfers in a single currency per account) and
//! serializes accounts into the OFX 2 and QIF interchange formats.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, account types, money, transactions)
//! - `export`: OFX and QIF serialization, plus a QIF reader
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer
//! - `audit`: Audit logging system
//! - `cli`: Command handlers for the `ledger` binary
//! - `display`: Terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_export::export::{export_qif, AccountNameResolver};
//! use ledger_export::models::{Account, Money, Transaction};
//!
//! let mut account = Account::new("Checking");
//! account.add_transaction(Transaction::new("Coffee", Money::parse("-3.50", "USD".parse()?)?));
//! let qif = export_qif(&account, false, &|_: &str| Ok("Assets:Checking".to_string()))?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
