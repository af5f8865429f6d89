//! Money type for representing currency amounts
//!
//! Amounts are `rust_decimal::Decimal` values bound to a currency code, so
//! arithmetic is exact and currencies cannot be mixed silently.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use super::currency::CurrencyCode;
use crate::error::{LedgerError, LedgerResult};

/// A signed decimal amount in a specific currency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: CurrencyCode,
}

impl Money {
    /// Create a Money amount
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Create a zero amount in the given currency
    pub fn zero(currency: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Parse a plain decimal string such as "-12.50"
    pub fn parse(s: &str, currency: CurrencyCode) -> LedgerResult<Self> {
        let amount = Decimal::from_str(s.trim()).map_err(|e| {
            LedgerError::InvalidFormat(format!("Invalid amount '{}': {}", s.trim(), e))
        })?;
        Ok(Self::new(amount, currency))
    }

    /// The decimal value
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency of this amount
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// The same value bound to another currency (no conversion)
    pub fn with_currency(self, currency: CurrencyCode) -> Self {
        Self {
            amount: self.amount,
            currency,
        }
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Check if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Add two amounts of the same currency
    pub fn checked_add(&self, other: &Money) -> LedgerResult<Money> {
        if self.currency != other.currency {
            return Err(LedgerError::CurrencyMismatch {
                left: self.currency.to_string(),
                right: other.currency.to_string(),
            });
        }
        let amount = self.amount.checked_add(other.amount).ok_or_else(|| {
            LedgerError::Overflow(format!("{} + {}", self.amount, other.amount))
        })?;
        Ok(Self::new(amount, self.currency.clone()))
    }

    /// Locale-independent decimal rendering, e.g. "-3.50"
    pub fn to_plain_string(&self) -> String {
        self.amount.to_string()
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> CurrencyCode {
        CurrencyCode::parse("USD").unwrap()
    }

    #[test]
    fn test_zero() {
        let zero = Money::zero(usd());
        assert!(zero.is_zero());
        assert_eq!(zero.to_plain_string(), "0");
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Money::new(Decimal::MAX, usd());
        let err = max.checked_add(&max).unwrap_err();
        assert!(matches!(err, LedgerError::Overflow(_)));
    }

    #[test]
    fn test_checked_add() {
        let a = Money::new(dec!(5.00), usd());
        let b = Money::new(dec!(-3.00), usd());
        assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(2.00));
    }

    #[test]
    fn test_checked_add_rejects_mixed_currencies() {
        let a = Money::new(dec!(1), usd());
        let b = Money::new(dec!(1), CurrencyCode::parse("EUR").unwrap());
        assert!(matches!(
            a.checked_add(&b),
            Err(LedgerError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_plain_string_keeps_scale() {
        assert_eq!(Money::new(dec!(4.50), usd()).to_plain_string(), "4.50");
        assert_eq!(Money::new(dec!(-12.5), usd()).to_plain_string(), "-12.5");
    }

    #[test]
    fn test_parse() {
        let m = Money::parse(" -10.25 ", usd()).unwrap();
        assert_eq!(m.amount(), dec!(-10.25));
        assert!(m.is_negative());
        assert!(Money::parse("ten", usd()).unwrap_err().is_invalid_format());
    }

    #[test]
    fn test_neg_and_display() {
        let m = -Money::new(dec!(7.25), usd());
        assert_eq!(m.to_string(), "-7.25 USD");
    }

    #[test]
    fn test_with_currency_keeps_value() {
        let eur = CurrencyCode::parse("EUR").unwrap();
        let m = Money::new(dec!(3.10), usd()).with_currency(eur.clone());
        assert_eq!(m.amount(), dec!(3.10));
        assert_eq!(m.currency(), &eur);
    }

    #[test]
    fn test_serialization() {
        let m = Money::new(dec!(10.50), usd());
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"amount":"10.50","currency":"USD"}"#);
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
