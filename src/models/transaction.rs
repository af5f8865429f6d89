//! Transaction model
//!
//! A single monetary movement recorded against an account. A transfer is a
//! single record owned by one account (`account_uid`) that also references the
//! counter account (`transfer_account_uid`); when loaded into the counter
//! account it appears as "the other leg".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::currency::CurrencyCode;
use super::money::Money;
use crate::export::ofx::{self, format_ofx_time};
use crate::export::qif;
use crate::export::xml::XmlElement;

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, used as the OFX `FITID`
    pub uid: String,

    /// Short description (payee or purpose)
    pub name: String,

    /// Longer free-form note
    #[serde(default)]
    pub memo: String,

    /// Signed amount (positive for inflow, negative for outflow)
    pub amount: Money,

    /// When the transaction happened
    pub time: DateTime<Utc>,

    /// Account owning this transaction; stamped when added to an account
    pub account_uid: Option<String>,

    /// Counter account of a transfer
    #[serde(default)]
    pub transfer_account_uid: Option<String>,

    /// Whether this transaction was included in a previous export
    #[serde(default)]
    pub exported: bool,
}

impl Transaction {
    /// Create a new, unassigned transaction
    pub fn new(name: impl Into<String>, amount: Money) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.into(),
            memo: String::new(),
            amount,
            time: Utc::now(),
            account_uid: None,
            transfer_account_uid: None,
            exported: false,
        }
    }

    /// Builder-style setter for the transaction time
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    /// Builder-style setter for the memo
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Rebind the amount to another currency without converting the value
    pub fn set_currency(&mut self, currency: CurrencyCode) {
        self.amount = self.amount.clone().with_currency(currency);
    }

    /// The currency of the amount
    pub fn currency(&self) -> &CurrencyCode {
        self.amount.currency()
    }

    /// Check if this is a transfer
    pub fn is_transfer(&self) -> bool {
        self.transfer_account_uid.is_some()
    }

    /// Whether this record belongs to the given account (rather than being the other leg)
    pub fn is_owned_by(&self, account_uid: &str) -> bool {
        self.account_uid.as_deref() == Some(account_uid)
    }

    /// Mark the transaction as exported
    pub fn mark_exported(&mut self) {
        self.exported = true;
    }

    /// Amount as seen from `account_uid`: the other leg of a transfer is negated
    pub fn amount_for(&self, account_uid: &str) -> Money {
        if self.account_uid.is_some() && !self.is_owned_by(account_uid) {
            -self.amount.clone()
        } else {
            self.amount.clone()
        }
    }

    /// Serialize as an OFX `STMTTRN` element from the point of view of `account_uid`
    pub fn to_ofx(&self, account_uid: &str) -> XmlElement {
        let amount = self.amount_for(account_uid);
        let trn_type = if amount.is_negative() { "DEBIT" } else { "CREDIT" };
        let posted = format_ofx_time(&self.time.fixed_offset());

        let mut element = XmlElement::new(ofx::TAG_TRANSACTION)
            .with_child(XmlElement::text_element(ofx::TAG_TRANSACTION_TYPE, trn_type))
            .with_child(XmlElement::text_element(ofx::TAG_DATE_POSTED, &posted))
            .with_child(XmlElement::text_element(ofx::TAG_DATE_USER, &posted))
            .with_child(XmlElement::text_element(
                ofx::TAG_TRANSACTION_AMOUNT,
                amount.to_plain_string(),
            ))
            .with_child(XmlElement::text_element(ofx::TAG_TRANSACTION_FITID, &self.uid))
            .with_child(XmlElement::text_element(ofx::TAG_NAME, &self.name));

        if !self.memo.is_empty() {
            element.push(XmlElement::text_element(ofx::TAG_MEMO, &self.memo));
        }

        element
    }

    /// Serialize as a QIF transaction record, terminated by `^` without a trailing newline
    pub fn to_qif(&self) -> String {
        let mut lines = vec![
            format!("{}{}", qif::DATE_PREFIX, self.time.format(qif::DATE_FORMAT)),
            format!("{}{}", qif::AMOUNT_PREFIX, self.amount.to_plain_string()),
            format!("{}{}", qif::PAYEE_PREFIX, qif::field_value(&self.name)),
        ];
        if !self.memo.is_empty() {
            lines.push(format!("{}{}", qif::MEMO_PREFIX, qif::field_value(&self.memo)));
        }
        lines.push(qif::ENTRY_TERMINATOR.to_string());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn usd() -> CurrencyCode {
        CurrencyCode::parse("USD").unwrap()
    }

    fn sample() -> Transaction {
        Transaction::new("Groceries", Money::new(dec!(-42.10), usd()))
            .at(Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap())
    }

    #[test]
    fn test_new_transaction_is_unassigned() {
        let txn = sample();
        assert!(txn.account_uid.is_none());
        assert!(!txn.exported);
        assert!(!txn.is_transfer());
        assert_eq!(txn.uid.len(), 36);
    }

    #[test]
    fn test_set_currency_keeps_value() {
        let mut txn = sample();
        txn.set_currency(CurrencyCode::parse("EUR").unwrap());
        assert_eq!(txn.currency().as_str(), "EUR");
        assert_eq!(txn.amount.amount(), dec!(-42.10));
    }

    #[test]
    fn test_amount_for_other_leg_is_negated() {
        let mut txn = sample();
        txn.account_uid = Some("checking".into());
        txn.transfer_account_uid = Some("savings".into());
        assert_eq!(txn.amount_for("checking").amount(), dec!(-42.10));
        assert_eq!(txn.amount_for("savings").amount(), dec!(42.10));
    }

    #[test]
    fn test_to_ofx() {
        let mut txn = sample().with_memo("weekly shop");
        txn.account_uid = Some("checking".into());

        let element = txn.to_ofx("checking");
        assert_eq!(element.name(), "STMTTRN");
        assert_eq!(element.child_text("TRNTYPE").as_deref(), Some("DEBIT"));
        assert_eq!(element.child_text("TRNAMT").as_deref(), Some("-42.10"));
        assert_eq!(
            element.child_text("DTPOSTED").as_deref(),
            Some("20240309143000[0:GMT]")
        );
        assert_eq!(element.child_text("FITID"), Some(txn.uid.clone()));
        assert_eq!(element.child_text("MEMO").as_deref(), Some("weekly shop"));
    }

    #[test]
    fn test_to_ofx_other_leg_is_credit() {
        let mut txn = sample();
        txn.account_uid = Some("checking".into());
        txn.transfer_account_uid = Some("savings".into());

        let element = txn.to_ofx("savings");
        assert_eq!(element.child_text("TRNTYPE").as_deref(), Some("CREDIT"));
        assert_eq!(element.child_text("TRNAMT").as_deref(), Some("42.10"));
        assert!(element.find("MEMO").is_none());
    }

    #[test]
    fn test_to_qif() {
        let txn = sample().with_memo("weekly shop");
        assert_eq!(
            txn.to_qif(),
            "D2024/03/09\nT-42.10\nPGroceries\nMweekly shop\n^"
        );
    }

    #[test]
    fn test_to_qif_without_memo() {
        assert_eq!(sample().to_qif(), "D2024/03/09\nT-42.10\nPGroceries\n^");
    }

    #[test]
    fn test_to_qif_flattens_line_breaks() {
        let txn = Transaction::new("Lunch\nT1000000", Money::new(dec!(-5.00), usd()))
            .at(Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap())
            .with_memo("first\nsecond");
        assert_eq!(
            txn.to_qif(),
            "D2024/03/09\nT-5.00\nPLunch T1000000\nMfirst second\n^"
        );
    }

    #[test]
    fn test_serialization() {
        let txn = sample();
        let json = serde_json::to_string(&txn).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, txn);
    }
}
