//! User settings for ledger-export
//!
//! Manages preferences: the fallback currency for new accounts and the
//! defaults used by the export command.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::models::CurrencyCode;

/// Interchange format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Open Financial Exchange (XML)
    #[default]
    Ofx,
    /// Quicken Interchange Format (text)
    Qif,
}

impl ExportFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ofx => "ofx",
            Self::Qif => "qif",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ofx => write!(f, "OFX"),
            Self::Qif => write!(f, "QIF"),
        }
    }
}

/// User settings for ledger-export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency for accounts created without an explicit one
    #[serde(default)]
    pub default_currency: CurrencyCode,

    /// Format used when the export command is given none
    #[serde(default)]
    pub default_export_format: ExportFormat,

    /// Export every transaction instead of only unexported ones
    #[serde(default)]
    pub export_all_by_default: bool,

    /// Flag transactions as exported after a successful export
    #[serde(default = "default_mark_exported")]
    pub mark_exported: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_mark_exported() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_currency: CurrencyCode::default(),
            default_export_format: ExportFormat::default(),
            export_all_by_default: false,
            mark_exported: default_mark_exported(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                LedgerError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            LedgerError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            LedgerError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.default_currency.as_str(), "USD");
        assert_eq!(settings.default_export_format, ExportFormat::Ofx);
        assert!(!settings.export_all_by_default);
        assert!(settings.mark_exported);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.default_currency = CurrencyCode::parse("EUR").unwrap();
        settings.default_export_format = ExportFormat::Qif;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.default_currency.as_str(), "EUR");
        assert_eq!(loaded.default_export_format, ExportFormat::Qif);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.schema_version, 1);
        assert!(settings.mark_exported);
        assert_eq!(settings.default_currency.as_str(), "USD");
    }

    #[test]
    fn test_invalid_currency_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"default_currency": "dollars"}"#).unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, LedgerError::Config(_)));
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Ofx.extension(), "ofx");
        assert_eq!(ExportFormat::Qif.extension(), "qif");
        assert_eq!(ExportFormat::Qif.to_string(), "QIF");
    }
}
