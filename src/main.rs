use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ledger_export::cli::{
    handle_account_command, handle_export_command, handle_transaction_command, AccountCommands,
    ExportArgs, TransactionCommands,
};
use ledger_export::config::{paths::LedgerPaths, settings::Settings};
use ledger_export::models::CurrencyCode;
use ledger_export::storage::Storage;

#[derive(Parser)]
#[command(
    name = "ledger",
    version,
    about = "Ledger accounts with OFX and QIF export",
    long_about = "Keeps a small hierarchy of ledger accounts and their transactions \
                  and exports them as OFX statements or QIF files for import into \
                  other accounting software."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Export accounts as OFX or QIF
    Export(ExportArgs),

    /// Show or change configuration
    Config {
        /// Set the default currency for new accounts
        #[arg(long)]
        currency: Option<String>,
        /// Set the default export format (ofx or qif)
        #[arg(long, value_enum)]
        format: Option<ledger_export::cli::FormatArg>,
        /// Export already exported transactions by default
        #[arg(long)]
        export_all: Option<bool>,
        /// Mark transactions as exported after an export
        #[arg(long)]
        mark_exported: Option<bool>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let paths = LedgerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Account(cmd)) => handle_account_command(&storage, &settings, cmd)?,
        Some(Commands::Transaction(cmd)) => handle_transaction_command(&storage, cmd)?,
        Some(Commands::Export(args)) => handle_export_command(&storage, &settings, args)?,
        Some(Commands::Config {
            currency,
            format,
            export_all,
            mark_exported,
        }) => {
            let changed = currency.is_some()
                || format.is_some()
                || export_all.is_some()
                || mark_exported.is_some();

            if let Some(code) = currency {
                settings.default_currency = CurrencyCode::parse(&code)?;
            }
            if let Some(format) = format {
                settings.default_export_format = format.into();
            }
            if let Some(export_all) = export_all {
                settings.export_all_by_default = export_all;
            }
            if let Some(mark_exported) = mark_exported {
                settings.mark_exported = mark_exported;
            }
            if changed {
                settings.save(&paths)?;
                tracing::info!("Saved settings to {}", paths.settings_file().display());
            }

            println!("ledger-export Configuration");
            println!("===========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Export directory: {}", paths.export_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Default currency:      {}", settings.default_currency);
            println!("  Default export format: {}", settings.default_export_format);
            println!("  Export all by default: {}", settings.export_all_by_default);
            println!("  Mark exported:         {}", settings.mark_exported);
        }
        None => {
            println!("ledger-export - Ledger accounts with OFX and QIF export");
            println!();
            println!("Run 'ledger --help' for usage information.");
        }
    }

    Ok(())
}
