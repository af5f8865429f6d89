//! Transaction CLI commands

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::Subcommand;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::display::transaction::format_transaction_register;
use crate::error::{LedgerError, LedgerResult};
use crate::services::{AccountService, AddTransactionInput, TransactionService};
use crate::storage::Storage;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Add a transaction to an account
    Add {
        /// Account name or UID
        account: String,
        /// Signed amount (negative for outflow), e.g. -12.50
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Short description
        #[arg(short, long, default_value = "")]
        name: String,
        /// Memo
        #[arg(short, long)]
        memo: Option<String>,
        /// Date (YYYY-MM-DD) or RFC 3339 timestamp; defaults to now
        #[arg(short, long)]
        date: Option<String>,
        /// Transfer counter account name or UID
        #[arg(short, long, conflicts_with = "no_transfer")]
        transfer_to: Option<String>,
        /// Ignore the account's default transfer account
        #[arg(long)]
        no_transfer: bool,
    },
    /// List an account's transactions
    List {
        /// Account name or UID
        account: String,
        /// Only show transactions not yet exported
        #[arg(short, long)]
        unexported: bool,
    },
    /// Delete a transaction
    Delete {
        /// Transaction UID
        uid: String,
    },
}

fn parse_amount(value: &str) -> LedgerResult<Decimal> {
    Decimal::from_str(value.trim()).map_err(|e| {
        LedgerError::Validation(format!("Invalid amount '{}': {}", value, e))
    })
}

/// Parse a `YYYY-MM-DD` date (noon UTC) or an RFC 3339 timestamp
fn parse_time(value: &str) -> LedgerResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .map(|naive: NaiveDateTime| naive.and_utc())
        .ok_or_else(|| {
            LedgerError::Validation(format!(
                "Invalid date '{}'. Use YYYY-MM-DD or an RFC 3339 timestamp",
                value
            ))
        })
}

/// Handle a transaction command
pub fn handle_transaction_command(storage: &Storage, cmd: TransactionCommands) -> LedgerResult<()> {
    let accounts = AccountService::new(storage);
    let service = TransactionService::new(storage);

    match cmd {
        TransactionCommands::Add {
            account,
            amount,
            name,
            memo,
            date,
            transfer_to,
            no_transfer,
        } => {
            let account = accounts.resolve(&account)?;
            let transfer_uid = transfer_to
                .map(|t| accounts.resolve(&t).map(|a| a.uid().to_string()))
                .transpose()?;

            let txn = service.add(AddTransactionInput {
                memo,
                time: date.as_deref().map(parse_time).transpose()?,
                transfer_account_uid: transfer_uid,
                no_transfer,
                ..AddTransactionInput::new(account.uid(), name, parse_amount(&amount)?)
            })?;

            println!("Added transaction to {}", account.name());
            println!("  Amount: {}", txn.amount);
            println!("  Date:   {}", txn.time.format("%Y-%m-%d"));
            if let Some(target) = &txn.transfer_account_uid {
                println!("  Transfer to: {}", target);
            }
            println!("  UID:    {}", txn.uid);
        }

        TransactionCommands::List {
            account,
            unexported,
        } => {
            let account = accounts.resolve(&account)?;
            let mut transactions = service.list_for_account(account.uid())?;
            if unexported {
                transactions.retain(|t| !t.exported);
            }
            print!(
                "{}",
                format_transaction_register(&transactions, account.uid())
            );
        }

        TransactionCommands::Delete { uid } => {
            let deleted = service.delete(&uid)?;
            println!("Deleted transaction: {} ({})", deleted.name, deleted.amount);
        }
    }

    Ok(())
}
