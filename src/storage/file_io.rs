//! File I/O utilities with atomic writes
//!
//! Account and transaction files are rewritten whole on every save, so each
//! write goes to a sibling temp file that is renamed over the target.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{LedgerError, LedgerResult};

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> LedgerError {
    LedgerError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> LedgerResult<T> {
    let file = File::open(path).map_err(|e| storage_error("open", path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_error("parse", path, e))
}

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> LedgerResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Ok(T::default());
    }
    parse_file(path)
}

/// Read JSON from a file, returning an error if file doesn't exist
pub fn read_json_required<T, P>(path: P) -> LedgerResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(LedgerError::Storage(format!(
            "File not found: {}",
            path.display()
        )));
    }
    parse_file(path)
}

/// Temp file path next to `path`; same directory keeps the rename atomic
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> LedgerResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("create directory", parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let file = File::create(&temp_path).map_err(|e| storage_error("create", &temp_path, e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| storage_error("serialize", path, e))?;
    writer
        .flush()
        .map_err(|e| storage_error("flush", &temp_path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| storage_error("sync", &temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        storage_error("replace", path, e)
    })
}

/// Write a text file atomically, used for export output
pub fn write_text_atomic<P: AsRef<Path>>(path: P, contents: &str) -> LedgerResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_error("create directory", parent, e))?;
    }

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, contents).map_err(|e| storage_error("write", &temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        storage_error("replace", path, e)
    })
}

/// Check if a JSON file exists and is valid
pub fn json_file_valid<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    path.exists() && parse_file::<serde_json::Value>(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Record {
        uid: String,
        exported: bool,
    }

    fn record() -> Record {
        Record {
            uid: "checking0123456789abcd".to_string(),
            exported: true,
        }
    }

    #[test]
    fn test_read_nonexistent_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let data: Record = read_json(temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(data, Record::default());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("accounts.json");

        write_json_atomic(&path, &record()).unwrap();
        let loaded: Record = read_json(&path).unwrap();
        assert_eq!(loaded, record());
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("accounts.json");

        write_json_atomic(&path, &record()).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("accounts.json.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("data").join("accounts.json");

        write_json_atomic(&path, &record()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_text_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("exports").join("ledger.qif");

        write_text_atomic(&path, "!Option:AutoSwitch\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "!Option:AutoSwitch\n");
        assert!(!temp_dir.path().join("exports").join("ledger.qif.tmp").exists());
    }

    #[test]
    fn test_json_file_valid() {
        let temp_dir = TempDir::new().unwrap();
        let valid_path = temp_dir.path().join("valid.json");
        let invalid_path = temp_dir.path().join("invalid.json");

        fs::write(&valid_path, r#"{"uid": "checking"}"#).unwrap();
        fs::write(&invalid_path, "not json at all").unwrap();

        assert!(json_file_valid(&valid_path));
        assert!(!json_file_valid(&invalid_path));
        assert!(!json_file_valid(temp_dir.path().join("missing.json")));
    }

    #[test]
    fn test_read_json_required() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("accounts.json");

        let err = read_json_required::<Record, _>(&path).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));

        write_json_atomic(&path, &record()).unwrap();
        let loaded: Record = read_json_required(&path).unwrap();
        assert_eq!(loaded, record());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("accounts.json");
        fs::write(&path, "{").unwrap();

        let err = read_json::<Record, _>(&path).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
    }
}
