//! Leave request workflow service.
//!
//! Enforces the one-active-leave-per-period rule and the linear status
//! workflow before delegating to the repository's transactional writes.

use domain::models::{
    CreateLeaveIntervalInput, LeaveInterval, LeaveStatus, UpdateLeaveIntervalInput,
};
use domain::DomainError;
use persistence::repositories::LeaveRequestRepository;
use uuid::Uuid;

use crate::error::EngineError;
use crate::services::ActionContext;

/// A reviewer's decision on a pending request.
#[derive(Debug, Clone)]
pub enum LeaveDecision {
    Approve,
    /// Rejection always carries a reason.
    Reject { reason: String },
}

impl LeaveDecision {
    fn status(&self) -> LeaveStatus {
        match self {
            LeaveDecision::Approve => LeaveStatus::Approved,
            LeaveDecision::Reject { .. } => LeaveStatus::Rejected,
        }
    }
}

/// Service for the leave request lifecycle.
#[derive(Clone)]
pub struct LeaveService {
    requests: LeaveRequestRepository,
}

impl LeaveService {
    pub fn new(requests: LeaveRequestRepository) -> Self {
        Self { requests }
    }

    /// Create a pending leave request. Rejects any overlap with another
    /// active (pending or approved) request of the same owner.
    pub async fn create_request(
        &self,
        input: CreateLeaveIntervalInput,
        ctx: &ActionContext,
    ) -> Result<LeaveInterval, EngineError> {
        input.validate()?;

        let overlaps = self
            .requests
            .has_active_overlap(input.user_id, input.start_date, input.end_date, None)
            .await?;
        if overlaps {
            return Err(EngineError::Conflict(
                "An active leave request already covers this period".to_string(),
            ));
        }

        let leave = self
            .requests
            .create(&input, ctx.actor_id, ctx.origin.clone())
            .await?;
        Ok(leave)
    }

    /// Edit a still-pending request, re-checking the overlap rule when the
    /// dates move.
    pub async fn update_request(
        &self,
        id: Uuid,
        input: UpdateLeaveIntervalInput,
        ctx: &ActionContext,
    ) -> Result<LeaveInterval, EngineError> {
        let current = self.find_request(id).await?;
        if current.status != LeaveStatus::Pending {
            return Err(EngineError::Conflict(format!(
                "Cannot update a leave request with status {}",
                current.status
            )));
        }
        input.validate_against(&current)?;

        let start = input.start_date.unwrap_or(current.start_date);
        let end = input.end_date.unwrap_or(current.end_date);
        let overlaps = self
            .requests
            .has_active_overlap(current.user_id, start, end, Some(id))
            .await?;
        if overlaps {
            return Err(EngineError::Conflict(
                "An active leave request already covers this period".to_string(),
            ));
        }

        self.requests
            .update(id, &input, ctx.actor_id, ctx.origin.clone())
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Leave request {} not found", id)))
    }

    /// Approve or reject a pending request. The workflow allows exactly one
    /// decision per request.
    pub async fn process_request(
        &self,
        id: Uuid,
        decision: LeaveDecision,
        ctx: &ActionContext,
    ) -> Result<LeaveInterval, EngineError> {
        let current = self.find_request(id).await?;
        current.check_transition(decision.status())?;

        let rejection_reason = match &decision {
            LeaveDecision::Approve => None,
            LeaveDecision::Reject { reason } => {
                if reason.trim().is_empty() {
                    return Err(EngineError::Domain(DomainError::MissingRejectionReason));
                }
                Some(reason.as_str())
            }
        };

        self.requests
            .decide(
                id,
                decision.status(),
                ctx.actor_id,
                rejection_reason,
                ctx.origin.clone(),
            )
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Leave request {} not found", id)))
    }

    /// Cancel a request. Allowed from pending, approved and rejected;
    /// terminal once done.
    pub async fn cancel_request(
        &self,
        id: Uuid,
        ctx: &ActionContext,
    ) -> Result<LeaveInterval, EngineError> {
        let current = self.find_request(id).await?;
        current.check_transition(LeaveStatus::Canceled)?;

        self.requests
            .cancel(id, ctx.actor_id, ctx.origin.clone())
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Leave request {} not found", id)))
    }

    /// Requests of one user, optionally filtered by status.
    pub async fn requests_for_user(
        &self,
        user_id: Uuid,
        status: Option<LeaveStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveInterval>, EngineError> {
        let requests = self
            .requests
            .find_by_user(user_id, status, limit, offset)
            .await?;
        Ok(requests)
    }

    /// Pending requests awaiting review.
    pub async fn pending_requests(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveInterval>, EngineError> {
        let requests = self.requests.find_pending(limit, offset).await?;
        Ok(requests)
    }

    async fn find_request(&self, id: Uuid) -> Result<LeaveInterval, EngineError> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Leave request {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_maps_to_status() {
        assert_eq!(LeaveDecision::Approve.status(), LeaveStatus::Approved);
        assert_eq!(
            LeaveDecision::Reject {
                reason: "Coverage gap".to_string()
            }
            .status(),
            LeaveStatus::Rejected
        );
    }
}
