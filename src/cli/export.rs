//! CLI command for OFX and QIF export

use chrono::Local;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use crate::config::settings::{ExportFormat, Settings};
use crate::error::LedgerResult;
use crate::services::{AccountService, ExportRequest, ExportService};
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Open Financial Exchange (XML)
    Ofx,
    /// Quicken Interchange Format
    Qif,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Ofx => ExportFormat::Ofx,
            FormatArg::Qif => ExportFormat::Qif,
        }
    }
}

/// Export arguments
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export format (defaults to the configured format)
    #[arg(value_enum)]
    pub format: Option<FormatArg>,

    /// Output file path (defaults to the exports directory)
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Accounts to export by name or UID (repeatable; defaults to all)
    #[arg(short, long = "account")]
    pub accounts: Vec<String>,

    /// Include transactions that were already exported
    #[arg(long)]
    pub all: bool,

    /// Do not mark exported transactions
    #[arg(long)]
    pub no_mark: bool,

    /// Print the document instead of writing a file; nothing is marked
    #[arg(long)]
    pub stdout: bool,
}

/// Handle the export command
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    args: ExportArgs,
) -> LedgerResult<()> {
    let accounts = AccountService::new(storage);
    let account_uids = args
        .accounts
        .iter()
        .map(|a| accounts.resolve(a).map(|a| a.uid().to_string()))
        .collect::<LedgerResult<Vec<_>>>()?;

    let request = ExportRequest {
        format: args
            .format
            .map(ExportFormat::from)
            .unwrap_or(settings.default_export_format),
        account_uids,
        include_all: args.all || settings.export_all_by_default,
        mark_exported: settings.mark_exported && !args.no_mark && !args.stdout,
    };

    let now = Local::now().fixed_offset();
    let service = ExportService::new(storage);

    if args.stdout {
        let outcome = service.render(&request, &now)?;
        print!("{}", outcome.content);
        return Ok(());
    }

    let outcome = service.export_to_file(&request, args.output, &now)?;
    match &outcome.path {
        Some(path) => {
            println!(
                "Exported {} account(s), {} transaction(s) as {} to {}",
                outcome.account_uids.len(),
                outcome.transaction_uids.len(),
                outcome.format,
                path.display()
            );
            if outcome.marked > 0 {
                println!("Marked {} transaction(s) as exported", outcome.marked);
            }
        }
        None => println!("Nothing to export. Use --all to include exported transactions."),
    }

    Ok(())
}
