//! Time entry lifecycle service.
//!
//! Validates inputs, then delegates to the repository, whose mutating
//! operations write the entity change and its audit entry in a single
//! transaction.

use chrono::Utc;
use domain::models::{
    CreateWorkIntervalInput, ReportPeriod, UpdateWorkIntervalInput, WorkInterval,
};
use persistence::repositories::TimeEntryRepository;
use uuid::Uuid;

use crate::error::EngineError;
use crate::services::ActionContext;

/// Service for creating, editing, approving and deleting time entries.
#[derive(Clone)]
pub struct TimeTrackingService {
    entries: TimeEntryRepository,
}

impl TimeTrackingService {
    pub fn new(entries: TimeEntryRepository) -> Self {
        Self { entries }
    }

    /// Create a time entry. Non-manual entries start approved; manual
    /// entries await an approver.
    pub async fn create_entry(
        &self,
        input: CreateWorkIntervalInput,
        ctx: &ActionContext,
    ) -> Result<WorkInterval, EngineError> {
        input.validate()?;
        let interval = self
            .entries
            .create(&input, ctx.actor_id, ctx.origin.clone())
            .await?;
        Ok(interval)
    }

    /// Apply a partial update to an existing entry.
    pub async fn update_entry(
        &self,
        id: Uuid,
        input: UpdateWorkIntervalInput,
        ctx: &ActionContext,
    ) -> Result<WorkInterval, EngineError> {
        let current = self
            .entries
            .find_by_id(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Time entry {} not found", id)))?;
        input.validate_against(&current)?;

        self.entries
            .update(id, &input, ctx.actor_id, ctx.origin.clone())
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Time entry {} not found", id)))
    }

    /// Hard-delete an entry; its previous-state snapshot is written to the
    /// audit trail in the same transaction as the delete.
    pub async fn delete_entry(
        &self,
        id: Uuid,
        ctx: &ActionContext,
    ) -> Result<WorkInterval, EngineError> {
        self.entries
            .delete(id, ctx.actor_id, ctx.origin.clone())
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Time entry {} not found", id)))
    }

    /// Approve a manual entry.
    pub async fn approve_entry(
        &self,
        id: Uuid,
        audit_note: Option<&str>,
        ctx: &ActionContext,
    ) -> Result<WorkInterval, EngineError> {
        self.entries
            .approve(id, ctx.actor_id, audit_note, ctx.origin.clone())
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Time entry {} not found", id)))
    }

    /// Entries for a user over a period; defaults to the current month when
    /// no period is given.
    pub async fn entries_for_period(
        &self,
        user_id: Uuid,
        period: Option<ReportPeriod>,
    ) -> Result<Vec<WorkInterval>, EngineError> {
        let period = period.unwrap_or_else(|| ReportPeriod::month_of(Utc::now()));
        let entries = self.entries.find_by_user_and_period(user_id, &period).await?;
        Ok(entries)
    }

    /// Manual entries awaiting approval.
    pub async fn pending_approval(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkInterval>, EngineError> {
        let entries = self.entries.find_pending_approval(limit, offset).await?;
        Ok(entries)
    }
}
