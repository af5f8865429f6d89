//! Account type taxonomy
//!
//! Every account type carries a fixed normal-balance polarity: the side
//! (debit or credit) that increases the account's value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the ledger that increases an account's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    Debit,
    Credit,
}

impl fmt::Display for NormalBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debit => write!(f, "Debit"),
            Self::Credit => write!(f, "Credit"),
        }
    }
}

/// Kind of ledger account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Cash,
    Bank,
    Credit,
    Asset,
    Liability,
    Income,
    Expense,
    Payable,
    Receivable,
    Equity,
    Currency,
    Stock,
    Mutual,
    Root,
}

impl AccountType {
    /// All account types in declaration order
    pub const ALL: [AccountType; 14] = [
        Self::Cash,
        Self::Bank,
        Self::Credit,
        Self::Asset,
        Self::Liability,
        Self::Income,
        Self::Expense,
        Self::Payable,
        Self::Receivable,
        Self::Equity,
        Self::Currency,
        Self::Stock,
        Self::Mutual,
        Self::Root,
    ];

    /// The normal balance of this account type
    ///
    /// To increase an account with a credit normal balance one credits it;
    /// likewise a debit normal balance account is increased by a debit.
    pub const fn normal_balance(&self) -> NormalBalance {
        match self {
            Self::Cash | Self::Asset | Self::Expense => NormalBalance::Debit,
            _ => NormalBalance::Credit,
        }
    }

    /// Returns true if this type is increased by debits
    pub const fn has_debit_normal_balance(&self) -> bool {
        matches!(self.normal_balance(), NormalBalance::Debit)
    }

    /// Parse account type from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "bank" => Some(Self::Bank),
            "credit" | "credit_card" | "creditcard" => Some(Self::Credit),
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "payable" => Some(Self::Payable),
            "receivable" => Some(Self::Receivable),
            "equity" => Some(Self::Equity),
            "currency" => Some(Self::Currency),
            "stock" => Some(Self::Stock),
            "mutual" | "mutual_fund" => Some(Self::Mutual),
            "root" => Some(Self::Root),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cash => "Cash",
            Self::Bank => "Bank",
            Self::Credit => "Credit Card",
            Self::Asset => "Asset",
            Self::Liability => "Liability",
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Payable => "Payable",
            Self::Receivable => "Receivable",
            Self::Equity => "Equity",
            Self::Currency => "Currency",
            Self::Stock => "Stock",
            Self::Mutual => "Mutual Fund",
            Self::Root => "Root",
        };
        write!(f, "{}", label)
    }
}
