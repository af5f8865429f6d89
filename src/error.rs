//! Custom error types for ledger-export
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for ledger-export operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A value did not match its required format (color codes, currency codes)
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A required argument was missing or unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Arithmetic across two different currencies
    #[error("Currency mismatch: cannot combine {left} with {right}")]
    CurrencyMismatch { left: String, right: String },

    /// Decimal arithmetic left the representable range
    #[error("Amount overflow: {0}")]
    Overflow(String),

    /// Rules enforced by the service layer (placeholder accounts, child accounts)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Import (QIF reading) errors
    #[error("Import error: {0}")]
    Import(String),

    /// Failure reported by an injected collaborator (name resolver, clock)
    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a "not found" error for accounts
    pub fn account_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a format error
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::InvalidFormat(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for ledger-export operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::InvalidFormat("Invalid color hex code: #ffff".into());
        assert_eq!(
            err.to_string(),
            "Invalid format: Invalid color hex code: #ffff"
        );
        assert!(err.is_invalid_format());
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::account_not_found("Checking");
        assert_eq!(err.to_string(), "Account not found: Checking");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_currency_mismatch_error() {
        let err = LedgerError::CurrencyMismatch {
            left: "USD".into(),
            right: "EUR".into(),
        };
        assert_eq!(
            err.to_string(),
            "Currency mismatch: cannot combine USD with EUR"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LedgerError = io_err.into();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
