//! Leave interval domain model.
//!
//! Leave is requested at date granularity with an inclusive end date. A
//! request moves through a linear workflow: created pending, decided exactly
//! once by a reviewer (approved/rejected), or canceled. Cancellation is a
//! terminal override, not a way back to pending.

use crate::DomainError;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::ValidationError;

/// Leave categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Vacation,
    SickLeave,
    SpecialPermit,
}

impl FromStr for LeaveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vacation" => Ok(LeaveType::Vacation),
            "sick_leave" => Ok(LeaveType::SickLeave),
            "special_permit" => Ok(LeaveType::SpecialPermit),
            _ => Err(format!("Unknown leave type: {}", s)),
        }
    }
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveType::Vacation => write!(f, "vacation"),
            LeaveType::SickLeave => write!(f, "sick_leave"),
            LeaveType::SpecialPermit => write!(f, "special_permit"),
        }
    }
}

/// Workflow status of a leave interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting a reviewer decision.
    Pending,
    /// Granted by a reviewer.
    Approved,
    /// Declined by a reviewer (with a reason).
    Rejected,
    /// Withdrawn; terminal for every prior status.
    Canceled,
}

impl LeaveStatus {
    /// Active leave blocks other leave for the same owner over the same days.
    pub fn is_active(&self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }

    /// The linear workflow: pending is decided exactly once, and any
    /// non-canceled status may be canceled.
    pub fn can_transition_to(&self, next: LeaveStatus) -> bool {
        match (self, next) {
            (LeaveStatus::Pending, LeaveStatus::Approved)
            | (LeaveStatus::Pending, LeaveStatus::Rejected)
            | (LeaveStatus::Pending, LeaveStatus::Canceled)
            | (LeaveStatus::Approved, LeaveStatus::Canceled)
            | (LeaveStatus::Rejected, LeaveStatus::Canceled) => true,
            _ => false,
        }
    }
}

impl FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(LeaveStatus::Pending),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            "canceled" => Ok(LeaveStatus::Canceled),
            _ => Err(format!("Unknown leave status: {}", s)),
        }
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "pending"),
            LeaveStatus::Approved => write!(f, "approved"),
            LeaveStatus::Rejected => write!(f, "rejected"),
            LeaveStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// A typed leave interval with an inclusive date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LeaveInterval {
    pub id: Uuid,
    pub user_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    /// Inclusive; leave is tracked at date level, not time level.
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    pub reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    /// Reference to supporting documentation (e.g. a sick note), if any.
    pub documentation_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LeaveInterval {
    /// Whether this interval counts against the one-active-leave-per-period
    /// rule.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Date-range overlap against another inclusive range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }

    /// Monday-to-Friday days covered by the inclusive range.
    pub fn business_days(&self) -> u32 {
        let mut count = 0;
        let mut day = self.start_date;
        while day <= self.end_date {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                count += 1;
            }
            day = day.checked_add_days(Days::new(1)).expect("date overflow");
        }
        count
    }

    /// Validate a reviewer decision against the workflow, returning the
    /// transition error if the interval is no longer pending.
    pub fn check_transition(&self, next: LeaveStatus) -> Result<(), DomainError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(DomainError::InvalidLeaveTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            })
        }
    }
}

/// Input for creating a new leave interval (created pending).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateLeaveIntervalInput {
    pub user_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub documentation_ref: Option<String>,
}

impl CreateLeaveIntervalInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        shared::validation::validate_leave_dates(self.start_date, self.end_date)?;
        if let Some(ref reason) = self.reason {
            shared::validation::validate_description(reason)?;
        }
        Ok(())
    }
}

/// Partial update of a still-pending leave interval.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateLeaveIntervalInput {
    pub leave_type: Option<LeaveType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

impl UpdateLeaveIntervalInput {
    /// Validate the date range that would result from applying this update.
    pub fn validate_against(&self, current: &LeaveInterval) -> Result<(), ValidationError> {
        let start = self.start_date.unwrap_or(current.start_date);
        let end = self.end_date.unwrap_or(current.end_date);
        shared::validation::validate_leave_dates(start, end)?;
        if let Some(ref reason) = self.reason {
            shared::validation::validate_description(reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn leave(start: (i32, u32, u32), end: (i32, u32, u32), status: LeaveStatus) -> LeaveInterval {
        LeaveInterval {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            leave_type: LeaveType::Vacation,
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            status,
            reason: None,
            reviewed_by: None,
            reviewed_at: None,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            documentation_ref: None,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_leave_type_roundtrip() {
        assert_eq!(LeaveType::from_str("vacation").unwrap(), LeaveType::Vacation);
        assert_eq!(
            LeaveType::from_str("sick_leave").unwrap(),
            LeaveType::SickLeave
        );
        assert_eq!(LeaveType::SpecialPermit.to_string(), "special_permit");
        assert!(LeaveType::from_str("sabbatical").is_err());
    }

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(
            LeaveStatus::from_str("pending").unwrap(),
            LeaveStatus::Pending
        );
        assert_eq!(LeaveStatus::Canceled.to_string(), "canceled");
        assert!(LeaveStatus::from_str("withdrawn").is_err());
    }

    #[test]
    fn test_pending_is_decided_exactly_once() {
        assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Approved));
        assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Rejected));
        assert!(LeaveStatus::Pending.can_transition_to(LeaveStatus::Canceled));
        assert!(!LeaveStatus::Approved.can_transition_to(LeaveStatus::Rejected));
        assert!(!LeaveStatus::Rejected.can_transition_to(LeaveStatus::Approved));
    }

    #[test]
    fn test_cancellation_is_terminal_override() {
        assert!(LeaveStatus::Approved.can_transition_to(LeaveStatus::Canceled));
        assert!(LeaveStatus::Rejected.can_transition_to(LeaveStatus::Canceled));
        assert!(!LeaveStatus::Canceled.can_transition_to(LeaveStatus::Pending));
        assert!(!LeaveStatus::Canceled.can_transition_to(LeaveStatus::Approved));
    }

    #[test]
    fn test_active_statuses() {
        assert!(LeaveStatus::Pending.is_active());
        assert!(LeaveStatus::Approved.is_active());
        assert!(!LeaveStatus::Rejected.is_active());
        assert!(!LeaveStatus::Canceled.is_active());
    }

    #[test]
    fn test_overlap() {
        let iv = leave((2024, 7, 8), (2024, 7, 12), LeaveStatus::Pending);
        // Touching ranges overlap (inclusive bounds)
        assert!(iv.overlaps(
            NaiveDate::from_ymd_opt(2024, 7, 12).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
        ));
        assert!(!iv.overlaps(
            NaiveDate::from_ymd_opt(2024, 7, 13).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
        ));
    }

    #[test]
    fn test_business_days_skips_weekend() {
        // Mon 2024-07-08 .. Sun 2024-07-14: five business days
        let iv = leave((2024, 7, 8), (2024, 7, 14), LeaveStatus::Approved);
        assert_eq!(iv.business_days(), 5);
    }

    #[test]
    fn test_check_transition_error_names_statuses() {
        let iv = leave((2024, 7, 8), (2024, 7, 12), LeaveStatus::Approved);
        let err = iv.check_transition(LeaveStatus::Rejected).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("approved"));
        assert!(msg.contains("rejected"));
    }

    #[test]
    fn test_create_input_rejects_single_day() {
        let input = CreateLeaveIntervalInput {
            user_id: Uuid::new_v4(),
            leave_type: LeaveType::SickLeave,
            start_date: NaiveDate::from_ymd_opt(2024, 7, 8).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 8).unwrap(),
            reason: None,
            documentation_ref: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_update_merges_with_current_dates() {
        let iv = leave((2024, 7, 8), (2024, 7, 12), LeaveStatus::Pending);
        let update = UpdateLeaveIntervalInput {
            end_date: Some(NaiveDate::from_ymd_opt(2024, 7, 5).unwrap()),
            ..Default::default()
        };
        assert!(update.validate_against(&iv).is_err());

        let update = UpdateLeaveIntervalInput {
            end_date: Some(NaiveDate::from_ymd_opt(2024, 7, 19).unwrap()),
            ..Default::default()
        };
        assert!(update.validate_against(&iv).is_ok());
    }
}
