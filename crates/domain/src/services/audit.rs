//! Audit entry construction.
//!
//! Provides a fluent builder plus convenience helpers for every audited
//! lifecycle action, so call sites build consistent entries without
//! hand-assembling snapshots.

use crate::models::{
    AuditAction, AuditResourceType, CreateAuditEntryInput, LeaveInterval, LeaveStatus,
    RequestOrigin, WorkInterval,
};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

/// Builder for audit entry inputs with a fluent API.
#[derive(Debug, Clone)]
pub struct AuditEntryBuilder {
    actor_id: Uuid,
    action: AuditAction,
    resource_type: AuditResourceType,
    resource_id: Uuid,
    previous_state: Option<JsonValue>,
    new_state: Option<JsonValue>,
    note: Option<String>,
    origin: Option<RequestOrigin>,
}

impl AuditEntryBuilder {
    pub fn new(
        actor_id: Uuid,
        action: AuditAction,
        resource_type: AuditResourceType,
        resource_id: Uuid,
    ) -> Self {
        Self {
            actor_id,
            action,
            resource_type,
            resource_id,
            previous_state: None,
            new_state: None,
            note: None,
            origin: None,
        }
    }

    /// Snapshot of the resource before the action.
    pub fn previous_state(mut self, state: JsonValue) -> Self {
        self.previous_state = Some(state);
        self
    }

    /// Snapshot of the resource after the action.
    pub fn new_state(mut self, state: JsonValue) -> Self {
        self.new_state = Some(state);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn origin(mut self, origin: RequestOrigin) -> Self {
        // An empty origin carries no information; drop it
        self.origin = if origin.is_empty() { None } else { Some(origin) };
        self
    }

    pub fn build(self) -> CreateAuditEntryInput {
        CreateAuditEntryInput {
            actor_id: self.actor_id,
            action: self.action,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            previous_state: self.previous_state,
            new_state: self.new_state,
            note: self.note,
            origin: self.origin,
        }
    }
}

/// Serialize the audited fields of a work interval.
pub fn work_interval_snapshot(interval: &WorkInterval) -> JsonValue {
    json!({
        "start_time": interval.start_time.to_rfc3339(),
        "end_time": interval.end_time.map(|t| t.to_rfc3339()),
        "description": interval.description,
        "is_manual_entry": interval.is_manual_entry,
        "is_approved": interval.is_approved,
    })
}

/// Serialize the audited fields of a leave interval.
pub fn leave_interval_snapshot(interval: &LeaveInterval) -> JsonValue {
    json!({
        "leave_type": interval.leave_type.to_string(),
        "start_date": interval.start_date.to_string(),
        "end_date": interval.end_date.to_string(),
        "status": interval.status.to_string(),
        "reason": interval.reason,
        "rejection_reason": interval.rejection_reason,
    })
}

/// Convenience constructors for the audited lifecycle actions.
pub mod audit_helpers {
    use super::*;

    /// Work interval created.
    pub fn time_entry_created(actor_id: Uuid, entry: &WorkInterval) -> CreateAuditEntryInput {
        AuditEntryBuilder::new(
            actor_id,
            AuditAction::Create,
            AuditResourceType::TimeEntry,
            entry.id,
        )
        .new_state(work_interval_snapshot(entry))
        .note("Time entry created")
        .build()
    }

    /// Work interval edited; both snapshots are recorded.
    pub fn time_entry_updated(
        actor_id: Uuid,
        before: &WorkInterval,
        after: &WorkInterval,
    ) -> CreateAuditEntryInput {
        AuditEntryBuilder::new(
            actor_id,
            AuditAction::Update,
            AuditResourceType::TimeEntry,
            after.id,
        )
        .previous_state(work_interval_snapshot(before))
        .new_state(work_interval_snapshot(after))
        .note("Time entry updated")
        .build()
    }

    /// Work interval hard-deleted; only the previous state survives.
    pub fn time_entry_deleted(actor_id: Uuid, deleted: &WorkInterval) -> CreateAuditEntryInput {
        AuditEntryBuilder::new(
            actor_id,
            AuditAction::Delete,
            AuditResourceType::TimeEntry,
            deleted.id,
        )
        .previous_state(work_interval_snapshot(deleted))
        .note("Time entry deleted")
        .build()
    }

    /// Work interval approved by a reviewer.
    pub fn time_entry_approved(
        approver_id: Uuid,
        entry: &WorkInterval,
        audit_note: Option<&str>,
    ) -> CreateAuditEntryInput {
        let mut builder = AuditEntryBuilder::new(
            approver_id,
            AuditAction::Approve,
            AuditResourceType::TimeEntry,
            entry.id,
        )
        .new_state(json!({ "is_approved": entry.is_approved }));

        builder = match audit_note {
            Some(note) => builder.note(format!("Time entry approved: {}", note)),
            None => builder.note("Time entry approved"),
        };
        builder.build()
    }

    /// Leave interval created (pending).
    pub fn leave_request_created(actor_id: Uuid, leave: &LeaveInterval) -> CreateAuditEntryInput {
        AuditEntryBuilder::new(
            actor_id,
            AuditAction::Create,
            AuditResourceType::LeaveRequest,
            leave.id,
        )
        .new_state(leave_interval_snapshot(leave))
        .note("Leave request created")
        .build()
    }

    /// Pending leave interval edited by its owner.
    pub fn leave_request_updated(
        actor_id: Uuid,
        before: &LeaveInterval,
        after: &LeaveInterval,
    ) -> CreateAuditEntryInput {
        AuditEntryBuilder::new(
            actor_id,
            AuditAction::Update,
            AuditResourceType::LeaveRequest,
            after.id,
        )
        .previous_state(leave_interval_snapshot(before))
        .new_state(leave_interval_snapshot(after))
        .note("Leave request updated")
        .build()
    }

    /// Reviewer decision on a pending leave interval.
    pub fn leave_request_decided(
        reviewer_id: Uuid,
        before: &LeaveInterval,
        after: &LeaveInterval,
    ) -> CreateAuditEntryInput {
        let action = match after.status {
            LeaveStatus::Approved => AuditAction::Approve,
            LeaveStatus::Rejected => AuditAction::Reject,
            _ => AuditAction::Update,
        };
        let note = format!("Leave request {}", after.status);

        AuditEntryBuilder::new(
            reviewer_id,
            action,
            AuditResourceType::LeaveRequest,
            after.id,
        )
        .previous_state(json!({ "status": before.status.to_string() }))
        .new_state(json!({
            "status": after.status.to_string(),
            "rejection_reason": after.rejection_reason,
        }))
        .note(note)
        .build()
    }

    /// Leave interval canceled (terminal override).
    pub fn leave_request_canceled(
        actor_id: Uuid,
        before: &LeaveInterval,
    ) -> CreateAuditEntryInput {
        AuditEntryBuilder::new(
            actor_id,
            AuditAction::Cancel,
            AuditResourceType::LeaveRequest,
            before.id,
        )
        .previous_state(json!({ "status": before.status.to_string() }))
        .new_state(json!({ "status": LeaveStatus::Canceled.to_string() }))
        .note("Leave request canceled")
        .build()
    }

    /// Successful sign-in.
    pub fn login(user_id: Uuid, origin: RequestOrigin) -> CreateAuditEntryInput {
        AuditEntryBuilder::new(user_id, AuditAction::Login, AuditResourceType::User, user_id)
            .origin(origin)
            .build()
    }

    /// Failed sign-in attempt against a known account.
    pub fn login_failed(user_id: Uuid, origin: RequestOrigin) -> CreateAuditEntryInput {
        AuditEntryBuilder::new(
            user_id,
            AuditAction::LoginFailed,
            AuditResourceType::User,
            user_id,
        )
        .origin(origin)
        .build()
    }
}
