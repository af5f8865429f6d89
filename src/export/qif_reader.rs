//! QIF reader
//!
//! Parses account sections and transaction records back out of QIF text.
//! Used to verify exports and to inspect QIF files produced elsewhere.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::qif::{ACCOUNT_HEADER, ENTRY_TERMINATOR, TYPE_HEADER_PREFIX};
use crate::error::{LedgerError, LedgerResult};

const DATE_FORMATS: [&str; 3] = ["%Y/%m/%d", "%m/%d/%Y", "%Y-%m-%d"];

/// One transaction record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QifTransaction {
    pub date: Option<NaiveDate>,
    pub amount: Decimal,
    pub payee: Option<String>,
    pub memo: Option<String>,
    pub category: Option<String>,
}

/// An account section with the transactions that follow it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QifAccountBlock {
    /// `N` line of the `!Account` section; `None` for records before any section
    pub name: Option<String>,
    /// `T` line of the `!Account` section
    pub account_type: Option<String>,
    /// Value after `!Type:`
    pub type_header: Option<String>,
    pub transactions: Vec<QifTransaction>,
}

#[derive(Debug, Default)]
struct PendingTransaction {
    date: Option<NaiveDate>,
    amount: Option<Decimal>,
    payee: Option<String>,
    memo: Option<String>,
    category: Option<String>,
    touched: bool,
}

impl PendingTransaction {
    fn finish(self, line_num: usize) -> LedgerResult<QifTransaction> {
        let amount = self.amount.ok_or_else(|| {
            LedgerError::Import(format!("Transaction ending at line {} has no amount", line_num))
        })?;
        Ok(QifTransaction {
            date: self.date,
            amount,
            payee: self.payee,
            memo: self.memo,
            category: self.category,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    AccountHeader,
    AccountDone,
    Records,
}

fn parse_amount(value: &str, line_num: usize) -> LedgerResult<Decimal> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned).map_err(|e| {
        LedgerError::Import(format!("Invalid amount '{}' at line {}: {}", value, line_num, e))
    })
}

fn parse_date(value: &str, line_num: usize) -> LedgerResult<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| LedgerError::Import(format!("Invalid date '{}' at line {}", value, line_num)))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse QIF text into account blocks
pub fn parse_qif(input: &str) -> LedgerResult<Vec<QifAccountBlock>> {
    let mut blocks: Vec<QifAccountBlock> = Vec::new();
    let mut current: Option<QifAccountBlock> = None;
    let mut pending = PendingTransaction::default();
    let mut section = Section::None;

    for (index, raw_line) in input.lines().enumerate() {
        let line_num = index + 1;
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if line == ACCOUNT_HEADER {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            current = Some(QifAccountBlock::default());
            section = Section::AccountHeader;
            continue;
        }

        if let Some(type_name) = line.strip_prefix(TYPE_HEADER_PREFIX) {
            let block = current.get_or_insert_with(QifAccountBlock::default);
            block.type_header = Some(type_name.trim().to_string());
            section = Section::Records;
            continue;
        }

        if line.starts_with('!') {
            // Options such as !Option:AutoSwitch carry no data
            continue;
        }

        if line == ENTRY_TERMINATOR {
            match section {
                Section::AccountHeader => section = Section::AccountDone,
                Section::Records => {
                    let finished = std::mem::take(&mut pending);
                    if finished.touched {
                        let transaction = finished.finish(line_num)?;
                        if let Some(block) = current.as_mut() {
                            block.transactions.push(transaction);
                        }
                    }
                }
                Section::None | Section::AccountDone => {}
            }
            continue;
        }

        let mut chars = line.chars();
        let prefix = chars.next().unwrap_or_default();
        let value = chars.as_str();
        match section {
            Section::AccountHeader => {
                if let Some(block) = current.as_mut() {
                    match prefix {
                        'N' => block.name = non_empty(value),
                        'T' => block.account_type = non_empty(value),
                        _ => {}
                    }
                }
            }
            Section::Records => {
                pending.touched = true;
                match prefix {
                    'D' => pending.date = Some(parse_date(value, line_num)?),
                    'T' => pending.amount = Some(parse_amount(value, line_num)?),
                    'U' => {
                        if pending.amount.is_none() {
                            pending.amount = Some(parse_amount(value, line_num)?);
                        }
                    }
                    'P' => pending.payee = non_empty(value),
                    'M' => pending.memo = non_empty(value),
                    'L' => pending.category = non_empty(value),
                    _ => {}
                }
            }
            Section::None | Section::AccountDone => {
                return Err(LedgerError::Import(format!(
                    "Record field '{}' at line {} is outside of a !Type section",
                    line, line_num
                )));
            }
        }
    }

    if pending.touched && pending.amount.is_some() {
        let transaction = pending.finish(input.lines().count())?;
        if let Some(block) = current.as_mut() {
            block.transactions.push(transaction);
        }
    }

    if let Some(block) = current.take() {
        blocks.push(block);
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_two_accounts() {
        let input = "!Option:AutoSwitch\n\
                     !Account\n\
                     NAssets:Checking\n\
                     TBank\n\
                     ^\n\
                     !Type:Bank\n\
                     D2024/01/15\n\
                     T-1,250.00\n\
                     PLandlord\n\
                     MJanuary rent\n\
                     ^\n\
                     !Account\n\
                     NLiabilities:Visa\n\
                     ^\n\
                     !Type:CCard\n\
                     D01/20/2024\n\
                     U-20.00\n\
                     PDiner\n\
                     ^\n\
                     !Clear:AutoSwitch\n";

        let blocks = parse_qif(input).unwrap();
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].name.as_deref(), Some("Assets:Checking"));
        assert_eq!(blocks[0].account_type.as_deref(), Some("Bank"));
        assert_eq!(blocks[0].type_header.as_deref(), Some("Bank"));
        let rent = &blocks[0].transactions[0];
        assert_eq!(rent.amount, dec!(-1250.00));
        assert_eq!(rent.date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(rent.payee.as_deref(), Some("Landlord"));
        assert_eq!(rent.memo.as_deref(), Some("January rent"));

        assert_eq!(blocks[1].type_header.as_deref(), Some("CCard"));
        assert_eq!(blocks[1].transactions[0].amount, dec!(-20.00));
        assert_eq!(
            blocks[1].transactions[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 20)
        );
    }

    #[test]
    fn test_records_without_account_section() {
        let input = "!Type:Cash\nD2024/03/01\nT5\n^\n";
        let blocks = parse_qif(input).unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].name.is_none());
        assert_eq!(blocks[0].transactions[0].amount, dec!(5));
    }

    #[test]
    fn test_missing_final_terminator() {
        let input = "!Type:Cash\nT5\n^\nT6\n";
        let blocks = parse_qif(input).unwrap();
        assert_eq!(blocks[0].transactions.len(), 2);
    }

    #[test]
    fn test_invalid_amount() {
        let err = parse_qif("!Type:Cash\nTfive\n^\n").unwrap_err();
        assert!(matches!(err, LedgerError::Import(_)));
    }

    #[test]
    fn test_transaction_without_amount() {
        let err = parse_qif("!Type:Cash\nPNobody\n^\n").unwrap_err();
        assert!(matches!(err, LedgerError::Import(_)));
    }

    #[test]
    fn test_record_outside_type_section() {
        let err = parse_qif("!Account\nNX\n^\nT5\n^\n").unwrap_err();
        assert!(matches!(err, LedgerError::Import(_)));
    }

    #[test]
    fn test_invalid_date() {
        let err = parse_qif("!Type:Cash\nDyesterday\nT1\n^\n").unwrap_err();
        assert!(matches!(err, LedgerError::Import(_)));
    }
}
