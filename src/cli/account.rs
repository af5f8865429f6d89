//! Account CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::account::{format_account_details, format_account_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{AccountType, CurrencyCode};
use crate::services::{AccountService, CreateAccountInput};
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Account type (cash, bank, credit, asset, liability, income, expense, ...)
        #[arg(short = 't', long, default_value = "cash")]
        account_type: String,
        /// ISO 4217 currency code (defaults to the configured currency)
        #[arg(short, long)]
        currency: Option<String>,
        /// Parent account name or UID
        #[arg(short, long)]
        parent: Option<String>,
        /// Default transfer account name or UID
        #[arg(long)]
        transfer_to: Option<String>,
        /// Color code (#rgb or #rrggbb)
        #[arg(long)]
        color: Option<String>,
        /// Only organizes sub-accounts
        #[arg(long)]
        placeholder: bool,
        /// Mark as favorite
        #[arg(long)]
        favorite: bool,
    },
    /// List all accounts
    List,
    /// Show account details
    Show {
        /// Account name or UID
        account: String,
    },
    /// Edit an account
    Edit {
        /// Account name or UID
        account: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New account type
        #[arg(short = 't', long)]
        account_type: Option<String>,
        /// New parent account name or UID
        #[arg(short, long, conflicts_with = "no_parent")]
        parent: Option<String>,
        /// Move to the top level
        #[arg(long)]
        no_parent: bool,
        /// New default transfer account name or UID
        #[arg(long, conflicts_with = "no_transfer")]
        transfer_to: Option<String>,
        /// Clear the default transfer account
        #[arg(long)]
        no_transfer: bool,
        /// New color code
        #[arg(long)]
        color: Option<String>,
        /// Set or clear the placeholder flag
        #[arg(long)]
        placeholder: Option<bool>,
        /// Set or clear the favorite flag
        #[arg(long)]
        favorite: Option<bool>,
    },
    /// Delete an account without sub-accounts or transactions
    Delete {
        /// Account name or UID
        account: String,
    },
}

fn parse_account_type(value: &str) -> LedgerResult<AccountType> {
    AccountType::parse(value).ok_or_else(|| {
        let valid: Vec<_> = AccountType::ALL
            .iter()
            .map(|t| format!("{:?}", t).to_lowercase())
            .collect();
        LedgerError::Validation(format!(
            "Invalid account type: '{}'. Valid types: {}",
            value,
            valid.join(", ")
        ))
    })
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AccountCommands,
) -> LedgerResult<()> {
    let service = AccountService::new(storage);

    match cmd {
        AccountCommands::Create {
            name,
            account_type,
            currency,
            parent,
            transfer_to,
            color,
            placeholder,
            favorite,
        } => {
            let currency = match currency {
                Some(code) => CurrencyCode::parse(&code)?,
                None => settings.default_currency.clone(),
            };
            let parent_uid = parent
                .map(|p| service.resolve(&p).map(|a| a.uid().to_string()))
                .transpose()?;
            let transfer_uid = transfer_to
                .map(|t| service.resolve(&t).map(|a| a.uid().to_string()))
                .transpose()?;

            let account = service.create(CreateAccountInput {
                name,
                account_type: parse_account_type(&account_type)?,
                currency: Some(currency),
                parent_uid,
                default_transfer_account_uid: transfer_uid,
                placeholder,
                color_code: color,
                favorite,
            })?;

            println!("Created account: {}", account.name());
            println!("  Type:     {}", account.account_type());
            println!("  Currency: {}", account.currency());
            println!("  UID:      {}", account.uid());
        }

        AccountCommands::List => {
            let summaries = service.list_with_balances()?;
            print!("{}", format_account_list(&summaries));
        }

        AccountCommands::Show { account } => {
            let found = service.resolve(&account)?;
            let summary = service.summary(found.uid())?;
            print!("{}", format_account_details(&summary));
        }

        AccountCommands::Edit {
            account,
            name,
            account_type,
            parent,
            no_parent,
            transfer_to,
            no_transfer,
            color,
            placeholder,
            favorite,
        } => {
            let found = service.resolve(&account)?;
            let uid = found.uid();
            let mut changed = false;

            if let Some(name) = name {
                service.rename(uid, &name)?;
                changed = true;
            }
            if let Some(account_type) = account_type {
                service.set_account_type(uid, parse_account_type(&account_type)?)?;
                changed = true;
            }
            if let Some(parent) = parent {
                let parent = service.resolve(&parent)?;
                service.set_parent(uid, Some(parent.uid()))?;
                changed = true;
            } else if no_parent {
                service.set_parent(uid, None)?;
                changed = true;
            }
            if let Some(transfer_to) = transfer_to {
                let target = service.resolve(&transfer_to)?;
                service.set_default_transfer(uid, Some(target.uid()))?;
                changed = true;
            } else if no_transfer {
                service.set_default_transfer(uid, None)?;
                changed = true;
            }
            if let Some(color) = color {
                service.set_color(uid, &color)?;
                changed = true;
            }
            if let Some(placeholder) = placeholder {
                service.set_placeholder(uid, placeholder)?;
                changed = true;
            }
            if let Some(favorite) = favorite {
                service.set_favorite(uid, favorite)?;
                changed = true;
            }

            if !changed {
                println!("No changes specified. Run 'ledger account edit --help' for options.");
                return Ok(());
            }

            let updated = service.resolve(uid)?;
            println!("Updated account: {}", updated.name());
        }

        AccountCommands::Delete { account } => {
            let found = service.resolve(&account)?;
            let deleted = service.delete(found.uid())?;
            println!("Deleted account: {}", deleted.name());
        }
    }

    Ok(())
}
