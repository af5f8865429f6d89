//! Export service
//!
//! Renders selected accounts into an OFX or QIF document, writes it and
//! then marks the exported transactions.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};

use crate::audit::AuditEntry;
use crate::config::settings::ExportFormat;
use crate::error::{LedgerError, LedgerResult};
use crate::export::{ofx, qif};
use crate::models::{Account, Transaction};
use crate::storage::{write_text_atomic, Storage};

/// What to export
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub format: ExportFormat,
    /// Account uids to export; empty means every account
    pub account_uids: Vec<String>,
    /// Include transactions that were already exported
    pub include_all: bool,
    /// Mark written transactions as exported
    pub mark_exported: bool,
}

/// Result of rendering an export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    pub content: String,
    /// Uids of the accounts present in the document
    pub account_uids: Vec<String>,
    /// Uids of the transactions written
    pub transaction_uids: Vec<String>,
    /// Written transactions owned by an exported account; only these are
    /// marked, so another account's unexported leg stays pending for it
    pub owned_uids: Vec<String>,
    /// Where the document was written, if it was
    pub path: Option<PathBuf>,
    /// Transactions newly flagged as exported
    pub marked: usize,
}

impl ExportOutcome {
    pub fn is_empty(&self) -> bool {
        self.account_uids.is_empty()
    }
}

/// Service for OFX and QIF export
pub struct ExportService<'a> {
    storage: &'a Storage,
}

impl<'a> ExportService<'a> {
    /// Create a new export service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn selected_accounts(&self, request: &ExportRequest) -> LedgerResult<Vec<Account>> {
        if request.account_uids.is_empty() {
            return self
                .storage
                .accounts
                .get_all()?
                .iter()
                .map(|a| self.storage.load_account(a.uid()))
                .collect();
        }

        request
            .account_uids
            .iter()
            .map(|uid| self.storage.load_account(uid))
            .collect()
    }

    fn exported_transactions<'t>(
        format: ExportFormat,
        account: &'t Account,
        include_all: bool,
    ) -> Vec<&'t Transaction> {
        match format {
            ExportFormat::Ofx => ofx::exportable_transactions(account, include_all).collect(),
            ExportFormat::Qif => qif::exportable_transactions(account, include_all).collect(),
        }
    }

    /// Render the document without touching storage
    ///
    /// Accounts with nothing to export are skipped unless `include_all` is
    /// set. An empty outcome means nothing qualified.
    pub fn render(
        &self,
        request: &ExportRequest,
        now: &DateTime<FixedOffset>,
    ) -> LedgerResult<ExportOutcome> {
        let mut account_uids = Vec::new();
        let mut transaction_uids = BTreeSet::new();
        let mut owned_uids = BTreeSet::new();
        let mut ofx_statements = Vec::new();
        let mut qif_blocks = Vec::new();

        for account in self.selected_accounts(request)? {
            let written = Self::exported_transactions(request.format, &account, request.include_all);
            if written.is_empty() && !request.include_all {
                tracing::debug!("Skipping account {} with nothing to export", account.uid());
                continue;
            }

            match request.format {
                ExportFormat::Ofx => {
                    ofx_statements.push(ofx::export_ofx(&account, request.include_all, now)?)
                }
                ExportFormat::Qif => qif_blocks.push(qif::export_qif(
                    &account,
                    request.include_all,
                    &self.storage.accounts,
                )?),
            }

            for transaction in &written {
                if transaction.is_owned_by(account.uid()) {
                    owned_uids.insert(transaction.uid.clone());
                }
                transaction_uids.insert(transaction.uid.clone());
            }
            account_uids.push(account.uid().to_string());
        }

        let content = match request.format {
            ExportFormat::Ofx => {
                ofx::render_document(&ofx::build_document(ofx_statements, now))?
            }
            ExportFormat::Qif => qif::build_document(&qif_blocks),
        };

        Ok(ExportOutcome {
            format: request.format,
            content,
            account_uids,
            transaction_uids: transaction_uids.into_iter().collect(),
            owned_uids: owned_uids.into_iter().collect(),
            path: None,
            marked: 0,
        })
    }

    /// Default output file inside the exports directory
    pub fn default_path(&self, format: ExportFormat, now: &DateTime<FixedOffset>) -> PathBuf {
        self.storage.paths().export_dir().join(format!(
            "ledger-{}.{}",
            now.format("%Y%m%d-%H%M%S"),
            format.extension()
        ))
    }

    /// Render, write to `path` (or the default path) and mark transactions
    ///
    /// Nothing is written or marked when no account qualified. Marking only
    /// happens after the file was written.
    pub fn export_to_file(
        &self,
        request: &ExportRequest,
        path: Option<PathBuf>,
        now: &DateTime<FixedOffset>,
    ) -> LedgerResult<ExportOutcome> {
        let mut outcome = self.render(request, now)?;
        if outcome.is_empty() {
            tracing::info!("Nothing to export");
            return Ok(outcome);
        }

        let path = path.unwrap_or_else(|| self.default_path(request.format, now));
        if path.is_dir() {
            return Err(LedgerError::Export(format!(
                "Output path {} is a directory",
                path.display()
            )));
        }
        write_text_atomic(&path, &outcome.content)?;
        tracing::info!(
            "Exported {} account(s) to {} as {}",
            outcome.account_uids.len(),
            path.display(),
            outcome.format
        );

        if request.mark_exported {
            outcome.marked = self
                .storage
                .transactions
                .mark_exported(&outcome.owned_uids)?;
            self.storage.transactions.save()?;
        }

        self.log_export(&outcome, &path)?;
        outcome.path = Some(path);
        Ok(outcome)
    }

    fn log_export(&self, outcome: &ExportOutcome, path: &std::path::Path) -> LedgerResult<()> {
        let entries = outcome
            .account_uids
            .iter()
            .map(|uid| -> LedgerResult<AuditEntry> {
                let name = self.storage.accounts.get(uid)?.map(|a| a.name().to_string());
                Ok(AuditEntry::export(
                    uid.as_str(),
                    name,
                    format!("{} to {}", outcome.format, path.display()),
                ))
            })
            .collect::<LedgerResult<Vec<_>>>()?;
        self.storage.audit().log_batch(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::paths::LedgerPaths;
    use crate::export::parse_qif;
    use crate::models::AccountType;
    use crate::services::account::{AccountService, CreateAccountInput};
    use crate::services::transaction::{AddTransactionInput, TransactionService};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 2, 1, 8, 0, 0)
            .unwrap()
    }

    /// Assets:Checking with two transactions and an empty Savings account
    fn seed(storage: &Storage) -> (Account, Account) {
        let accounts = AccountService::new(storage);
        let assets = accounts
            .create(CreateAccountInput {
                name: "Assets".into(),
                account_type: AccountType::Asset,
                placeholder: true,
                ..Default::default()
            })
            .unwrap();
        let checking = accounts
            .create(CreateAccountInput {
                name: "Checking".into(),
                account_type: AccountType::Bank,
                parent_uid: Some(assets.uid().to_string()),
                ..Default::default()
            })
            .unwrap();
        let savings = accounts
            .create(CreateAccountInput {
                name: "Savings".into(),
                account_type: AccountType::Bank,
                ..Default::default()
            })
            .unwrap();

        let transactions = TransactionService::new(storage);
        transactions
            .add(AddTransactionInput::new(checking.uid(), "Paycheck", dec!(1500.00)))
            .unwrap();
        transactions
            .add(AddTransactionInput {
                memo: Some("Fish & chips".into()),
                ..AddTransactionInput::new(checking.uid(), "Diner", dec!(-20.00))
            })
            .unwrap();

        (checking, savings)
    }

    #[test]
    fn test_render_ofx_skips_empty_accounts() {
        let (_temp_dir, storage) = create_test_storage();
        let (checking, savings) = seed(&storage);

        let outcome = ExportService::new(&storage)
            .render(&ExportRequest::default(), &now())
            .unwrap();

        assert_eq!(outcome.account_uids, vec![checking.uid().to_string()]);
        assert_eq!(outcome.transaction_uids.len(), 2);
        assert!(outcome.content.starts_with("<?xml"));
        assert!(outcome.content.contains(checking.uid()));
        assert!(!outcome.content.contains(savings.uid()));
        assert!(outcome.content.contains("<MEMO>Fish &amp; chips</MEMO>"));
        assert!(outcome.content.contains("<BALAMT>1480.00</BALAMT>"));
    }

    #[test]
    fn test_render_include_all_keeps_empty_accounts() {
        let (_temp_dir, storage) = create_test_storage();
        let (_checking, savings) = seed(&storage);

        let outcome = ExportService::new(&storage)
            .render(
                &ExportRequest {
                    include_all: true,
                    ..Default::default()
                },
                &now(),
            )
            .unwrap();

        assert_eq!(outcome.account_uids.len(), 3);
        assert!(outcome.content.contains(savings.uid()));
    }

    #[test]
    fn test_render_qif_uses_qualified_names() {
        let (_temp_dir, storage) = create_test_storage();
        let (checking, _savings) = seed(&storage);

        let outcome = ExportService::new(&storage)
            .render(
                &ExportRequest {
                    format: ExportFormat::Qif,
                    account_uids: vec![checking.uid().to_string()],
                    ..Default::default()
                },
                &now(),
            )
            .unwrap();

        let blocks = parse_qif(&outcome.content).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name.as_deref(), Some("Assets:Checking"));
        assert_eq!(blocks[0].type_header.as_deref(), Some("Bank"));
        let amounts: Vec<_> = blocks[0].transactions.iter().map(|t| t.amount).collect();
        assert!(amounts.contains(&dec!(1500.00)));
        assert!(amounts.contains(&dec!(-20.00)));
    }

    #[test]
    fn test_unknown_account_fails() {
        let (_temp_dir, storage) = create_test_storage();
        let result = ExportService::new(&storage).render(
            &ExportRequest {
                account_uids: vec!["missing".into()],
                ..Default::default()
            },
            &now(),
        );
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_export_to_file_marks_transactions() {
        let (temp_dir, storage) = create_test_storage();
        seed(&storage);
        let service = ExportService::new(&storage);
        let path = temp_dir.path().join("out.ofx");

        let outcome = service
            .export_to_file(
                &ExportRequest {
                    mark_exported: true,
                    ..Default::default()
                },
                Some(path.clone()),
                &now(),
            )
            .unwrap();

        assert_eq!(outcome.marked, 2);
        assert_eq!(outcome.path.as_deref(), Some(path.as_path()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), outcome.content);
        assert!(storage.transactions.get_all().unwrap().iter().all(|t| t.exported));

        let audit = storage.audit().read_all().unwrap();
        assert_eq!(audit.last().unwrap().operation, Operation::Export);

        let again = service
            .export_to_file(&ExportRequest::default(), None, &now())
            .unwrap();
        assert!(again.is_empty());
        assert!(again.path.is_none());
    }

    #[test]
    fn test_export_without_marking() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);
        let service = ExportService::new(&storage);

        let outcome = service
            .export_to_file(
                &ExportRequest {
                    format: ExportFormat::Qif,
                    ..Default::default()
                },
                None,
                &now(),
            )
            .unwrap();

        assert_eq!(outcome.marked, 0);
        let path = outcome.path.unwrap();
        assert_eq!(path, service.default_path(ExportFormat::Qif, &now()));
        assert!(path.ends_with("ledger-20240201-080000.qif"));
        assert!(storage.transactions.get_all().unwrap().iter().all(|t| !t.exported));
    }

    #[test]
    fn test_exporting_counter_account_leaves_owner_leg_pending() {
        let (temp_dir, storage) = create_test_storage();
        let (checking, savings) = seed(&storage);
        let transfer = TransactionService::new(&storage)
            .add(AddTransactionInput {
                transfer_account_uid: Some(savings.uid().to_string()),
                ..AddTransactionInput::new(checking.uid(), "To savings", dec!(-50))
            })
            .unwrap();
        let service = ExportService::new(&storage);

        let outcome = service
            .export_to_file(
                &ExportRequest {
                    account_uids: vec![savings.uid().to_string()],
                    mark_exported: true,
                    ..Default::default()
                },
                Some(temp_dir.path().join("savings.ofx")),
                &now(),
            )
            .unwrap();

        assert_eq!(outcome.transaction_uids, vec![transfer.uid.clone()]);
        assert!(outcome.owned_uids.is_empty());
        assert_eq!(outcome.marked, 0);
        assert!(!storage.transactions.get(&transfer.uid).unwrap().unwrap().exported);

        let next = service
            .render(
                &ExportRequest {
                    account_uids: vec![checking.uid().to_string()],
                    ..Default::default()
                },
                &now(),
            )
            .unwrap();
        assert_eq!(next.account_uids, vec![checking.uid().to_string()]);
        assert!(next.transaction_uids.contains(&transfer.uid));
    }
}
