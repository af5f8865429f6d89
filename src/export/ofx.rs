//! OFX export
//!
//! Builds OFX 2 statement elements for accounts and wraps them into a full
//! OFX document. Element order follows the OFX banking statement grammar.

use chrono::{DateTime, FixedOffset};
use std::fmt;

use super::xml::{XmlElement, XmlWriter};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, AccountType, Transaction};

/// Bank identifier written into every `BANKID`
pub const APP_ID: &str = "ledger-export";

/// Language reported in the sign-on response
pub const LANGUAGE: &str = "ENG";

pub const TAG_OFX: &str = "OFX";
pub const TAG_SIGNON_MESSAGES: &str = "SIGNONMSGSRSV1";
pub const TAG_SIGNON_RESPONSE: &str = "SONRS";
pub const TAG_STATUS: &str = "STATUS";
pub const TAG_STATUS_CODE: &str = "CODE";
pub const TAG_STATUS_SEVERITY: &str = "SEVERITY";
pub const TAG_DATE_SERVER: &str = "DTSERVER";
pub const TAG_LANGUAGE: &str = "LANGUAGE";
pub const TAG_BANK_MESSAGES: &str = "BANKMSGSRSV1";
pub const TAG_STATEMENT_TRANSACTION_RESPONSE: &str = "STMTTRNRS";
pub const TAG_TRANSACTION_UID: &str = "TRNUID";
pub const TAG_STATEMENT_TRANSACTIONS: &str = "STMTRS";
pub const TAG_CURRENCY_DEF: &str = "CURDEF";
pub const TAG_BANK_ACCOUNT_FROM: &str = "BANKACCTFROM";
pub const TAG_BANK_ID: &str = "BANKID";
pub const TAG_ACCOUNT_ID: &str = "ACCTID";
pub const TAG_ACCOUNT_TYPE: &str = "ACCTTYPE";
pub const TAG_LEDGER_BALANCE: &str = "LEDGERBAL";
pub const TAG_BALANCE_AMOUNT: &str = "BALAMT";
pub const TAG_DATE_AS_OF: &str = "DTASOF";
pub const TAG_BANK_TRANSACTION_LIST: &str = "BANKTRANLIST";
pub const TAG_DATE_START: &str = "DTSTART";
pub const TAG_DATE_END: &str = "DTEND";
pub const TAG_TRANSACTION: &str = "STMTTRN";
pub const TAG_TRANSACTION_TYPE: &str = "TRNTYPE";
pub const TAG_DATE_POSTED: &str = "DTPOSTED";
pub const TAG_DATE_USER: &str = "DTUSER";
pub const TAG_TRANSACTION_AMOUNT: &str = "TRNAMT";
pub const TAG_TRANSACTION_FITID: &str = "FITID";
pub const TAG_NAME: &str = "NAME";
pub const TAG_MEMO: &str = "MEMO";

const OFX_HEADER_DATA: &str =
    "OFXHEADER=\"200\" VERSION=\"211\" SECURITY=\"NONE\" OLDFILEUID=\"NONE\" NEWFILEUID=\"NONE\"";

/// Account types understood by OFX banking statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfxAccountType {
    Checking,
    Savings,
    MoneyMrkt,
    CreditLine,
}

impl OfxAccountType {
    /// The `ACCTTYPE` value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Savings => "SAVINGS",
            Self::MoneyMrkt => "MONEYMRKT",
            Self::CreditLine => "CREDITLINE",
        }
    }
}

impl fmt::Display for OfxAccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AccountType> for OfxAccountType {
    fn from(account_type: AccountType) -> Self {
        to_ofx_type(account_type)
    }
}

/// Map a ledger account type onto the OFX account types
pub fn to_ofx_type(account_type: AccountType) -> OfxAccountType {
    match account_type {
        AccountType::Credit | AccountType::Liability => OfxAccountType::CreditLine,

        AccountType::Cash
        | AccountType::Income
        | AccountType::Expense
        | AccountType::Payable
        | AccountType::Receivable => OfxAccountType::Checking,

        AccountType::Bank | AccountType::Asset => OfxAccountType::Savings,

        AccountType::Mutual | AccountType::Stock | AccountType::Equity | AccountType::Currency => {
            OfxAccountType::MoneyMrkt
        }

        AccountType::Root => OfxAccountType::Checking,
    }
}

/// Format a timestamp as `YYYYMMDDHHMMSS[offset:zone]`
///
/// The offset is the whole-hour part of the UTC offset, e.g.
/// `20240105143000[-5:GMT-05:00]`; UTC renders as `[0:GMT]`.
pub fn format_ofx_time(time: &DateTime<FixedOffset>) -> String {
    let offset_seconds = time.offset().local_minus_utc();
    let hours = offset_seconds / 3600;
    let sign = if offset_seconds > 0 { "+" } else { "" };
    let zone = if offset_seconds == 0 {
        "GMT".to_string()
    } else {
        format!("GMT{}", time.format("%:z"))
    };
    format!("{}[{}{}:{}]", time.format("%Y%m%d%H%M%S"), sign, hours, zone)
}

/// Transactions included in an OFX statement for `account`
pub fn exportable_transactions(
    account: &Account,
    include_all: bool,
) -> impl Iterator<Item = &Transaction> {
    account
        .transactions()
        .iter()
        .filter(move |t| include_all || !t.exported)
}

/// Build the `STMTRS` statement element for one account
///
/// Already exported transactions are skipped unless `include_all` is set.
/// Nothing is marked as exported here. Fails if the ledger balance
/// overflows.
pub fn export_ofx(
    account: &Account,
    include_all: bool,
    now: &DateTime<FixedOffset>,
) -> LedgerResult<XmlElement> {
    let timestamp = format_ofx_time(now);

    let bank_account_from = XmlElement::new(TAG_BANK_ACCOUNT_FROM)
        .with_child(XmlElement::text_element(TAG_BANK_ID, APP_ID))
        .with_child(XmlElement::text_element(TAG_ACCOUNT_ID, account.uid()))
        .with_child(XmlElement::text_element(
            TAG_ACCOUNT_TYPE,
            to_ofx_type(account.account_type()).as_str(),
        ));

    let mut transaction_list = XmlElement::new(TAG_BANK_TRANSACTION_LIST)
        .with_child(XmlElement::text_element(TAG_DATE_START, &timestamp))
        .with_child(XmlElement::text_element(TAG_DATE_END, &timestamp));
    for transaction in exportable_transactions(account, include_all) {
        transaction_list.push(transaction.to_ofx(account.uid()));
    }

    let ledger_balance = XmlElement::new(TAG_LEDGER_BALANCE)
        .with_child(XmlElement::text_element(
            TAG_BALANCE_AMOUNT,
            account.balance()?.to_plain_string(),
        ))
        .with_child(XmlElement::text_element(TAG_DATE_AS_OF, &timestamp));

    Ok(XmlElement::new(TAG_STATEMENT_TRANSACTIONS)
        .with_child(XmlElement::text_element(
            TAG_CURRENCY_DEF,
            account.currency().as_str(),
        ))
        .with_child(bank_account_from)
        .with_child(transaction_list)
        .with_child(ledger_balance))
}

fn success_status() -> XmlElement {
    XmlElement::new(TAG_STATUS)
        .with_child(XmlElement::text_element(TAG_STATUS_CODE, "0"))
        .with_child(XmlElement::text_element(TAG_STATUS_SEVERITY, "INFO"))
}

/// Wrap statements into an `OFX` root with sign-on and banking message sets
pub fn build_document(statements: Vec<XmlElement>, now: &DateTime<FixedOffset>) -> XmlElement {
    let signon = XmlElement::new(TAG_SIGNON_MESSAGES).with_child(
        XmlElement::new(TAG_SIGNON_RESPONSE)
            .with_child(success_status())
            .with_child(XmlElement::text_element(TAG_DATE_SERVER, format_ofx_time(now)))
            .with_child(XmlElement::text_element(TAG_LANGUAGE, LANGUAGE)),
    );

    let mut bank_messages = XmlElement::new(TAG_BANK_MESSAGES);
    for (index, statement) in statements.into_iter().enumerate() {
        bank_messages.push(
            XmlElement::new(TAG_STATEMENT_TRANSACTION_RESPONSE)
                .with_child(XmlElement::text_element(
                    TAG_TRANSACTION_UID,
                    (index + 1).to_string(),
                ))
                .with_child(success_status())
                .with_child(statement),
        );
    }

    XmlElement::new(TAG_OFX)
        .with_child(signon)
        .with_child(bank_messages)
}

/// Render a full OFX document including the XML and OFX headers
pub fn render_document(root: &XmlElement) -> LedgerResult<String> {
    let mut writer = XmlWriter::new(Vec::new());
    writer.write_declaration()?;
    writer.write_processing_instruction(TAG_OFX, OFX_HEADER_DATA)?;
    writer.write_element(root)?;
    let bytes = writer.into_inner()?;
    String::from_utf8(bytes).map_err(|e| LedgerError::Export(e.to_string()))
}
