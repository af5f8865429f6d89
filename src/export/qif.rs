//! QIF export
//!
//! Produces Quicken Interchange Format blocks: an account section naming the
//! account by its fully-qualified name, a type header, then one record per
//! transaction owned by the account.

use crate::error::LedgerResult;
use crate::models::{Account, AccountType, Transaction};

pub const ACCOUNT_HEADER: &str = "!Account";
pub const ACCOUNT_NAME_PREFIX: &str = "N";
pub const ACCOUNT_TYPE_PREFIX: &str = "T";
pub const ENTRY_TERMINATOR: &str = "^";
pub const TYPE_HEADER_PREFIX: &str = "!Type:";
pub const OPTION_AUTOSWITCH: &str = "!Option:AutoSwitch";
pub const CLEAR_AUTOSWITCH: &str = "!Clear:AutoSwitch";

pub const DATE_PREFIX: &str = "D";
pub const AMOUNT_PREFIX: &str = "T";
pub const PAYEE_PREFIX: &str = "P";
pub const MEMO_PREFIX: &str = "M";
pub const CATEGORY_PREFIX: &str = "L";

/// Date format of `D` lines
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Separator between segments of a fully-qualified account name
pub const ACCOUNT_NAME_SEPARATOR: &str = ":";

/// Resolves an account uid to its fully-qualified name, root first
pub trait AccountNameResolver {
    fn fully_qualified_name(&self, account_uid: &str) -> LedgerResult<String>;
}

impl<F> AccountNameResolver for F
where
    F: Fn(&str) -> LedgerResult<String>,
{
    fn fully_qualified_name(&self, account_uid: &str) -> LedgerResult<String> {
        self(account_uid)
    }
}

/// Field text with line breaks collapsed to single spaces
///
/// QIF is line oriented, so a raw newline would start a new field.
pub fn field_value(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The `!Type:` header line for an account type
pub fn qif_header(account_type: AccountType) -> &'static str {
    match account_type {
        AccountType::Cash => "!Type:Cash",
        AccountType::Bank => "!Type:Bank",
        AccountType::Credit => "!Type:CCard",
        AccountType::Asset => "!Type:Oth A",
        AccountType::Liability => "!Type:Oth L",
        _ => "!Type:Cash",
    }
}

/// Transactions written for `account`: only records the account owns (the
/// other legs of transfers are skipped), filtered by export state
pub fn exportable_transactions(
    account: &Account,
    include_all: bool,
) -> impl Iterator<Item = &Transaction> {
    account
        .transactions()
        .iter()
        .filter(move |t| t.is_owned_by(account.uid()))
        .filter(move |t| include_all || !t.exported)
}

/// Export one account as a QIF block
///
/// Resolver failures are returned unchanged and no partial output is produced.
pub fn export_qif<R>(account: &Account, include_all: bool, resolver: &R) -> LedgerResult<String>
where
    R: AccountNameResolver + ?Sized,
{
    let qualified_name = resolver.fully_qualified_name(account.uid())?;

    let mut output = String::new();
    output.push_str(ACCOUNT_HEADER);
    output.push('\n');
    output.push_str(ACCOUNT_NAME_PREFIX);
    output.push_str(&field_value(&qualified_name));
    output.push('\n');
    output.push_str(ENTRY_TERMINATOR);
    output.push('\n');
    output.push_str(qif_header(account.account_type()));
    output.push('\n');

    for transaction in exportable_transactions(account, include_all) {
        output.push_str(&transaction.to_qif());
        output.push('\n');
    }

    Ok(output)
}

/// Join account blocks into one QIF document
pub fn build_document(blocks: &[String]) -> String {
    let mut output = String::new();
    output.push_str(OPTION_AUTOSWITCH);
    output.push('\n');
    for block in blocks {
        output.push_str(block);
    }
    output.push_str(CLEAR_AUTOSWITCH);
    output.push('\n');
    output
}
