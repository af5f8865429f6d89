//! ISO 4217 currency codes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

/// Fallback currency used when an account is created without one
pub const DEFAULT_CURRENCY_CODE: &str = "USD";

/// A three-letter uppercase currency code such as `USD` or `EUR`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a currency code, normalizing to uppercase
    pub fn parse(code: &str) -> LedgerResult<Self> {
        let normalized = code.trim().to_ascii_uppercase();
        if normalized.len() != 3 || !normalized.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(LedgerError::InvalidFormat(format!(
                "Invalid currency code: '{}'",
                code
            )));
        }
        Ok(Self(normalized))
    }

    /// The code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self(DEFAULT_CURRENCY_CODE.to_string())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}
