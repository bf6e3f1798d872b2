//! Work interval domain model.
//!
//! A work interval is a single stretch of recorded working time: either an
//! automatically captured clock-in/clock-out pair or a manually entered
//! correction. Manual entries require approval before they count as
//! authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidationError;

/// A bounded (or still open) stretch of recorded working time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkInterval {
    pub id: Uuid,
    /// Owner of the interval.
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// None while the interval is still running.
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    /// Manually entered (as opposed to captured by clock-in/clock-out).
    pub is_manual_entry: bool,
    pub is_approved: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub audit_note: Option<String>,
    pub audit_change_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkInterval {
    /// An interval counts toward totals only once it has an end.
    pub fn is_completed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Duration in whole seconds, or None while the interval is open.
    pub fn duration_seconds(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_seconds())
    }
}

/// Input for creating a new work interval.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateWorkIntervalInput {
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_manual_entry: bool,
}

impl CreateWorkIntervalInput {
    /// Validate interval bounds and free-text limits. Malformed input is
    /// rejected before any computation or write, never clamped.
    pub fn validate(&self) -> Result<(), ValidationError> {
        shared::validation::validate_interval_bounds(self.start_time, self.end_time)?;
        if let Some(ref description) = self.description {
            shared::validation::validate_description(description)?;
        }
        Ok(())
    }

    /// Whether the created interval starts out approved. Automatically
    /// captured entries are trusted; manual entries await an approver.
    pub fn initial_approval(&self) -> bool {
        !self.is_manual_entry
    }
}

/// Partial update of an existing work interval.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateWorkIntervalInput {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub is_manual_entry: Option<bool>,
}

impl UpdateWorkIntervalInput {
    /// Validate the interval that would result from applying this update to
    /// `current`.
    pub fn validate_against(&self, current: &WorkInterval) -> Result<(), ValidationError> {
        let start = self.start_time.unwrap_or(current.start_time);
        let end = self.end_time.or(current.end_time);
        shared::validation::validate_interval_bounds(start, end)?;
        if let Some(ref description) = self.description {
            shared::validation::validate_description(description)?;
        }
        Ok(())
    }

    /// An update that turns an automatic entry into a manual one invalidates
    /// any prior approval.
    pub fn resets_approval(&self, current: &WorkInterval) -> bool {
        matches!(self.is_manual_entry, Some(true)) && !current.is_manual_entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn interval(start_h: u32, end_h: Option<u32>) -> WorkInterval {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, start_h, 0, 0).unwrap();
        WorkInterval {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_time: start,
            end_time: end_h.map(|h| Utc.with_ymd_and_hms(2024, 3, 4, h, 0, 0).unwrap()),
            description: None,
            is_manual_entry: false,
            is_approved: true,
            approved_by: None,
            approved_at: None,
            audit_note: None,
            audit_change_type: None,
            created_at: start,
        }
    }

    #[test]
    fn test_duration_of_completed_interval() {
        let iv = interval(8, Some(16));
        assert!(iv.is_completed());
        assert_eq!(iv.duration_seconds(), Some(8 * 3600));
    }

    #[test]
    fn test_open_interval_has_no_duration() {
        let iv = interval(8, None);
        assert!(!iv.is_completed());
        assert_eq!(iv.duration_seconds(), None);
    }

    #[test]
    fn test_create_input_rejects_end_before_start() {
        let input = CreateWorkIntervalInput {
            user_id: Uuid::new_v4(),
            start_time: Utc.with_ymd_and_hms(2024, 3, 4, 16, 0, 0).unwrap(),
            end_time: Some(Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()),
            description: None,
            is_manual_entry: false,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_input_open_interval_is_valid() {
        let input = CreateWorkIntervalInput {
            user_id: Uuid::new_v4(),
            start_time: Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap(),
            end_time: None,
            description: Some("Morning shift".to_string()),
            is_manual_entry: false,
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_manual_entry_defaults_unapproved() {
        let input = CreateWorkIntervalInput {
            user_id: Uuid::new_v4(),
            start_time: Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap(),
            end_time: None,
            description: None,
            is_manual_entry: true,
        };
        assert!(!input.initial_approval());
    }

    #[test]
    fn test_automatic_entry_defaults_approved() {
        let input = CreateWorkIntervalInput {
            user_id: Uuid::new_v4(),
            start_time: Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap(),
            end_time: None,
            description: None,
            is_manual_entry: false,
        };
        assert!(input.initial_approval());
    }

    #[test]
    fn test_update_validates_combined_bounds() {
        let current = interval(8, Some(16));
        // Moving the start past the existing end must fail
        let update = UpdateWorkIntervalInput {
            start_time: Some(Utc.with_ymd_and_hms(2024, 3, 4, 17, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(update.validate_against(&current).is_err());

        // Moving the end later is fine
        let update = UpdateWorkIntervalInput {
            end_time: Some(Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(update.validate_against(&current).is_ok());
    }

    #[test]
    fn test_switch_to_manual_resets_approval() {
        let current = interval(8, Some(16));
        let update = UpdateWorkIntervalInput {
            is_manual_entry: Some(true),
            ..Default::default()
        };
        assert!(update.resets_approval(&current));

        let mut manual = interval(8, Some(16));
        manual.is_manual_entry = true;
        assert!(!update.resets_approval(&manual));
    }
}
