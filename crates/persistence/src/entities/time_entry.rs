//! Time entry entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for time entries.
#[derive(Debug, Clone, FromRow)]
pub struct TimeEntryEntity {
    /// Unique identifier.
    pub id: Uuid,

    /// Owner of the entry.
    pub user_id: Uuid,

    /// When the working time started.
    pub start_time: DateTime<Utc>,

    /// When the working time ended; NULL while the entry is running.
    pub end_time: Option<DateTime<Utc>>,

    /// Free-text description.
    pub description: Option<String>,

    /// Entered by hand rather than captured by clock-in/clock-out.
    pub is_manual_entry: bool,

    /// Whether an approver has accepted the entry.
    pub is_approved: bool,

    /// Approver, if approved.
    pub approved_by: Option<Uuid>,

    /// When the entry was approved.
    pub approved_at: Option<DateTime<Utc>>,

    /// Note attached during approval or correction.
    pub audit_note: Option<String>,

    /// Kind of change the note refers to (e.g. "approval").
    pub audit_change_type: Option<String>,

    /// Timestamp when the record was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last modification.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_entry_entity_creation() {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        let entity = TimeEntryEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_time: start,
            end_time: Some(Utc.with_ymd_and_hms(2024, 3, 4, 16, 0, 0).unwrap()),
            description: Some("On-site shift".to_string()),
            is_manual_entry: false,
            is_approved: true,
            approved_by: None,
            approved_at: None,
            audit_note: None,
            audit_change_type: None,
            created_at: start,
            updated_at: start,
        };

        assert!(entity.end_time.is_some());
        assert!(entity.is_approved);
        assert!(!entity.is_manual_entry);
    }
}
