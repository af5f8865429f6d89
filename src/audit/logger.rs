//! Audit logger for append-only audit log
//!
//! Each entry is written as a single JSON line and flushed immediately.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, LedgerResult};

use super::entry::AuditEntry;

/// Writes audit entries to a JSONL file
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new AuditLogger that writes to the specified path
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    fn open_for_append(&self) -> LedgerResult<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| LedgerError::Io(format!("Failed to open audit log: {}", e)))
    }

    fn write_entry(file: &mut File, entry: &AuditEntry) -> LedgerResult<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| LedgerError::Json(format!("Failed to serialize audit entry: {}", e)))?;
        writeln!(file, "{}", json)
            .map_err(|e| LedgerError::Io(format!("Failed to write audit entry: {}", e)))
    }

    /// Append one entry
    pub fn log(&self, entry: &AuditEntry) -> LedgerResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// Append several entries with a single flush
    pub fn log_batch(&self, entries: &[AuditEntry]) -> LedgerResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut file = self.open_for_append()?;
        for entry in entries {
            Self::write_entry(&mut file, entry)?;
        }
        file.flush()
            .map_err(|e| LedgerError::Io(format!("Failed to flush audit log: {}", e)))
    }

    /// Read all audit entries, oldest first
    pub fn read_all(&self) -> LedgerResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| LedgerError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                LedgerError::Io(format!("Failed to read audit log line {}: {}", index + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
                LedgerError::Json(format!(
                    "Failed to parse audit entry at line {}: {}",
                    index + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Read the most recent `count` entries
    pub fn read_recent(&self, count: usize) -> LedgerResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{EntityType, Operation};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    fn account_entry(uid: &str) -> AuditEntry {
        AuditEntry::create(
            EntityType::Account,
            uid,
            Some("Checking".to_string()),
            &json!({"uid": uid, "name": "Checking"}),
        )
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        logger.log(&account_entry("checking")).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(entries[0].entity_id, "checking");
    }

    #[test]
    fn test_log_batch_and_read_recent() {
        let (logger, _temp) = create_test_logger();
        let entries: Vec<_> = (0..5).map(|i| account_entry(&format!("acct{}", i))).collect();
        logger.log_batch(&entries).unwrap();

        let recent = logger.read_recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].entity_id, "acct3");
        assert_eq!(recent[1].entity_id, "acct4");
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();
        assert!(logger.read_all().unwrap().is_empty());
        assert!(logger.read_recent(3).unwrap().is_empty());
        logger.log_batch(&[]).unwrap();
        assert!(!logger.path().exists());
    }

    #[test]
    fn test_appends_across_instances() {
        let (logger, temp) = create_test_logger();
        logger.log(&account_entry("first")).unwrap();

        let reopened = AuditLogger::new(temp.path().join("audit.log"));
        reopened
            .log(&AuditEntry::export("first", None, "QIF, 1 transaction"))
            .unwrap();

        let entries = reopened.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].operation, Operation::Export);
    }

    #[test]
    fn test_corrupt_line_is_json_error() {
        let (logger, _temp) = create_test_logger();
        std::fs::write(logger.path(), "{not json}\n").unwrap();
        assert!(matches!(logger.read_all(), Err(LedgerError::Json(_))));
    }
}
