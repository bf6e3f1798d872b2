//! Audit entry entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for audit entries.
///
/// Rows in `audit_entries` are append-only: nothing updates or deletes them
/// except the retention sweep.
#[derive(Debug, Clone, FromRow)]
pub struct AuditEntryEntity {
    /// Unique identifier.
    pub id: Uuid,

    /// User who performed the action.
    pub actor_id: Uuid,

    /// Action verb (create, update, delete, approve, ...). Open set.
    pub action: String,

    /// Type of resource affected.
    pub resource_type: String,

    /// ID of the resource affected.
    pub resource_id: Uuid,

    /// Insertion-order sequence; breaks timestamp ties.
    pub seq: i64,

    /// When the action occurred.
    pub timestamp: DateTime<Utc>,

    /// Snapshot of the resource before the action.
    pub previous_state: Option<serde_json::Value>,

    /// Snapshot of the resource after the action.
    pub new_state: Option<serde_json::Value>,

    /// Free-text note.
    pub note: Option<String>,

    /// IP address of the originating request.
    pub ip_address: Option<String>,

    /// User agent of the originating request.
    pub user_agent: Option<String>,

    /// Timestamp when the record was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_entry_entity_creation() {
        let now = Utc::now();
        let entity = AuditEntryEntity {
            id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            action: "approve".to_string(),
            resource_type: "time_entry".to_string(),
            resource_id: Uuid::new_v4(),
            seq: 42,
            timestamp: now,
            previous_state: None,
            new_state: Some(serde_json::json!({ "is_approved": true })),
            note: Some("Time entry approved".to_string()),
            ip_address: Some("192.168.1.1".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            created_at: now,
        };

        assert_eq!(entity.action, "approve");
        assert_eq!(entity.resource_type, "time_entry");
        assert_eq!(entity.seq, 42);
    }
}
