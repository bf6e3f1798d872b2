//! Leave request entity.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database entity for leave requests.
#[derive(Debug, Clone, FromRow)]
pub struct LeaveRequestEntity {
    /// Unique identifier.
    pub id: Uuid,

    /// Owner of the request.
    pub user_id: Uuid,

    /// Leave category (vacation, sick_leave, special_permit).
    pub leave_type: String,

    /// First day of leave.
    pub start_date: NaiveDate,

    /// Last day of leave, inclusive.
    pub end_date: NaiveDate,

    /// Workflow status (pending, approved, rejected, canceled).
    pub status: String,

    /// Free-text reason given by the requester.
    pub reason: Option<String>,

    /// Reviewer who looked at the request.
    pub reviewed_by: Option<Uuid>,

    /// When the request was reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,

    /// Approver, if approved.
    pub approved_by: Option<Uuid>,

    /// When the request was approved.
    pub approved_at: Option<DateTime<Utc>>,

    /// Reason given on rejection.
    pub rejection_reason: Option<String>,

    /// Reference to supporting documentation, if any.
    pub documentation_ref: Option<String>,

    /// Timestamp when the record was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last modification.
    pub updated_at: DateTime<Utc>,
}
