//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Entity was created
    Create,
    /// Entity was updated
    Update,
    /// Entity was deleted
    Delete,
    /// Entity was written to an interchange file
    Export,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Export => write!(f, "EXPORT"),
        }
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Account,
    Transaction,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Account => write!(f, "Account"),
            EntityType::Transaction => write!(f, "Transaction"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    /// Uid of the affected entity
    pub entity_id: String,

    /// Account or transaction name at the time of the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Human-readable diff or export summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn new(
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: None,
            after: None,
            diff_summary: None,
        }
    }

    /// Entry for a newly created entity
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            after: serde_json::to_value(entity).ok(),
            ..Self::new(Operation::Create, entity_type, entity_id, entity_name)
        }
    }

    /// Entry for an update, with both snapshots
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Self {
        Self {
            before: serde_json::to_value(before).ok(),
            after: serde_json::to_value(after).ok(),
            diff_summary,
            ..Self::new(Operation::Update, entity_type, entity_id, entity_name)
        }
    }

    /// Entry for a deleted entity
    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            before: serde_json::to_value(entity).ok(),
            ..Self::new(Operation::Delete, entity_type, entity_id, entity_name)
        }
    }

    /// Entry for an account written to an export file
    pub fn export(
        account_uid: impl Into<String>,
        account_name: Option<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            diff_summary: Some(summary.into()),
            ..Self::new(Operation::Export, EntityType::Account, account_uid, account_name)
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Delete.to_string(), "DELETE");
        assert_eq!(Operation::Export.to_string(), "EXPORT");
    }

    #[test]
    fn test_create_entry() {
        let data = json!({"uid": "checking0123456789abcd", "name": "Checking"});
        let entry = AuditEntry::create(
            EntityType::Account,
            "checking0123456789abcd",
            Some("Checking".to_string()),
            &data,
        );

        assert_eq!(entry.operation, Operation::Create);
        assert!(entry.before.is_none());
        assert_eq!(entry.after, Some(data));
    }

    #[test]
    fn test_update_entry() {
        let before = json!({"name": "Checking", "favorite": false});
        let after = json!({"name": "Checking", "favorite": true});

        let entry = AuditEntry::update(
            EntityType::Account,
            "checking0123456789abcd",
            None,
            &before,
            &after,
            Some("favorite: false -> true".to_string()),
        );

        assert_eq!(entry.operation, Operation::Update);
        assert!(entry.before.is_some());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_delete_entry() {
        let entry = AuditEntry::delete(
            EntityType::Transaction,
            "4f1c",
            Some("Coffee".to_string()),
            &json!({"name": "Coffee"}),
        );

        assert_eq!(entry.operation, Operation::Delete);
        assert!(entry.before.is_some());
        assert!(entry.after.is_none());
    }

    #[test]
    fn test_export_entry() {
        let entry = AuditEntry::export("checking", Some("Checking".into()), "OFX, 3 transactions");
        assert_eq!(entry.operation, Operation::Export);
        assert_eq!(entry.entity_type, EntityType::Account);

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("EXPORT Account checking (Checking)"));
        assert!(formatted.contains("OFX, 3 transactions"));
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let entry = AuditEntry::export("checking", None, "QIF");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("before"));
        assert!(json.contains("\"operation\":\"export\""));

        let deserialized: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.operation, Operation::Export);
    }
}
