//! Leave request repository for database operations.
//!
//! Status changes and edits are written together with their audit entries
//! in one transaction, mirroring the time entry repository.

use chrono::{NaiveDate, Utc};
use domain::models::{
    CreateLeaveIntervalInput, LeaveInterval, LeaveStatus, LeaveType, RequestOrigin,
    UpdateLeaveIntervalInput,
};
use domain::services::audit_helpers;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::LeaveRequestEntity;
use crate::metrics::QueryTimer;
use crate::repositories::audit_entry::insert_entry;

const SELECT_COLUMNS: &str = "id, user_id, leave_type, start_date, end_date, status, reason, \
     reviewed_by, reviewed_at, approved_by, approved_at, rejection_reason, documentation_ref, \
     created_at, updated_at";

/// Repository for leave request database operations.
#[derive(Clone)]
pub struct LeaveRequestRepository {
    pool: PgPool,
}

impl LeaveRequestRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a leave request by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveInterval>, sqlx::Error> {
        let timer = QueryTimer::new("find_leave_request_by_id");
        let entity = sqlx::query_as::<_, LeaveRequestEntity>(&format!(
            "SELECT {} FROM leave_requests WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        Ok(entity.map(entity_to_domain))
    }

    /// Leave requests for a user, optionally filtered by status, newest
    /// first.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        status: Option<LeaveStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveInterval>, sqlx::Error> {
        let timer = QueryTimer::new("find_leave_requests_by_user");
        let entities = match status {
            Some(status) => {
                sqlx::query_as::<_, LeaveRequestEntity>(&format!(
                    r#"
                    SELECT {}
                    FROM leave_requests
                    WHERE user_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                    SELECT_COLUMNS
                ))
                .bind(user_id)
                .bind(status.to_string())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, LeaveRequestEntity>(&format!(
                    r#"
                    SELECT {}
                    FROM leave_requests
                    WHERE user_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                    SELECT_COLUMNS
                ))
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };
        timer.record();

        Ok(entities.into_iter().map(entity_to_domain).collect())
    }

    /// Pending requests awaiting review, oldest first.
    pub async fn find_pending(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LeaveInterval>, sqlx::Error> {
        let timer = QueryTimer::new("find_pending_leave_requests");
        let entities = sqlx::query_as::<_, LeaveRequestEntity>(&format!(
            r#"
            SELECT {}
            FROM leave_requests
            WHERE status = 'pending'
            ORDER BY created_at
            LIMIT $1 OFFSET $2
            "#,
            SELECT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(entities.into_iter().map(entity_to_domain).collect())
    }

    /// Whether the user already has an active (pending or approved) request
    /// overlapping the inclusive date range.
    pub async fn has_active_overlap(
        &self,
        user_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("leave_request_active_overlap");
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM leave_requests
                WHERE user_id = $1
                  AND status IN ('pending', 'approved')
                  AND start_date <= $3
                  AND end_date >= $2
                  AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        timer.record();

        Ok(exists)
    }

    /// Create a pending leave request and its audit record in one
    /// transaction. The overlap rule is enforced by the calling service.
    pub async fn create(
        &self,
        input: &CreateLeaveIntervalInput,
        actor_id: Uuid,
        origin: Option<RequestOrigin>,
    ) -> Result<LeaveInterval, sqlx::Error> {
        let timer = QueryTimer::new("create_leave_request");
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, LeaveRequestEntity>(&format!(
            r#"
            INSERT INTO leave_requests (user_id, leave_type, start_date, end_date, reason, documentation_ref)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(input.user_id)
        .bind(input.leave_type.to_string())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.reason)
        .bind(&input.documentation_ref)
        .fetch_one(&mut *tx)
        .await?;

        let leave = entity_to_domain(entity);
        let mut audit = audit_helpers::leave_request_created(actor_id, &leave);
        audit.origin = origin;
        insert_entry(&mut tx, &audit).await?;

        tx.commit().await?;
        timer.record();
        Ok(leave)
    }

    /// Apply a partial edit to a still-pending request, auditing the
    /// before/after snapshots in the same transaction.
    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateLeaveIntervalInput,
        actor_id: Uuid,
        origin: Option<RequestOrigin>,
    ) -> Result<Option<LeaveInterval>, sqlx::Error> {
        let timer = QueryTimer::new("update_leave_request");
        let mut tx = self.pool.begin().await?;

        let Some(current) = sqlx::query_as::<_, LeaveRequestEntity>(&format!(
            "SELECT {} FROM leave_requests WHERE id = $1 FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };
        let before = entity_to_domain(current);

        let leave_type = input.leave_type.unwrap_or(before.leave_type);
        let start_date = input.start_date.unwrap_or(before.start_date);
        let end_date = input.end_date.unwrap_or(before.end_date);
        let reason = input.reason.clone().or_else(|| before.reason.clone());

        let entity = sqlx::query_as::<_, LeaveRequestEntity>(&format!(
            r#"
            UPDATE leave_requests
            SET leave_type = $2, start_date = $3, end_date = $4, reason = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(leave_type.to_string())
        .bind(start_date)
        .bind(end_date)
        .bind(&reason)
        .fetch_one(&mut *tx)
        .await?;

        let after = entity_to_domain(entity);
        let mut audit = audit_helpers::leave_request_updated(actor_id, &before, &after);
        audit.origin = origin;
        insert_entry(&mut tx, &audit).await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(after))
    }

    /// Record a reviewer decision (approved or rejected), stamping reviewer
    /// fields and auditing the transition in one transaction.
    pub async fn decide(
        &self,
        id: Uuid,
        next_status: LeaveStatus,
        reviewer_id: Uuid,
        rejection_reason: Option<&str>,
        origin: Option<RequestOrigin>,
    ) -> Result<Option<LeaveInterval>, sqlx::Error> {
        let timer = QueryTimer::new("decide_leave_request");
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let Some(current) = sqlx::query_as::<_, LeaveRequestEntity>(&format!(
            "SELECT {} FROM leave_requests WHERE id = $1 FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };
        let before = entity_to_domain(current);

        let approved = next_status == LeaveStatus::Approved;
        let entity = sqlx::query_as::<_, LeaveRequestEntity>(&format!(
            r#"
            UPDATE leave_requests
            SET status = $2, reviewed_by = $3, reviewed_at = $4,
                approved_by = CASE WHEN $5 THEN $3 ELSE approved_by END,
                approved_at = CASE WHEN $5 THEN $4 ELSE approved_at END,
                rejection_reason = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(next_status.to_string())
        .bind(reviewer_id)
        .bind(now)
        .bind(approved)
        .bind(rejection_reason)
        .fetch_one(&mut *tx)
        .await?;

        let after = entity_to_domain(entity);
        let mut audit = audit_helpers::leave_request_decided(reviewer_id, &before, &after);
        audit.origin = origin;
        insert_entry(&mut tx, &audit).await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(after))
    }

    /// Cancel a request (terminal override), auditing the prior status in
    /// the same transaction.
    pub async fn cancel(
        &self,
        id: Uuid,
        actor_id: Uuid,
        origin: Option<RequestOrigin>,
    ) -> Result<Option<LeaveInterval>, sqlx::Error> {
        let timer = QueryTimer::new("cancel_leave_request");
        let mut tx = self.pool.begin().await?;

        let Some(current) = sqlx::query_as::<_, LeaveRequestEntity>(&format!(
            "SELECT {} FROM leave_requests WHERE id = $1 FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };
        let before = entity_to_domain(current);

        let entity = sqlx::query_as::<_, LeaveRequestEntity>(&format!(
            r#"
            UPDATE leave_requests
            SET status = 'canceled', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let after = entity_to_domain(entity);
        let mut audit = audit_helpers::leave_request_canceled(actor_id, &before);
        audit.origin = origin;
        insert_entry(&mut tx, &audit).await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(after))
    }
}

/// Convert entity to domain model.
fn entity_to_domain(entity: LeaveRequestEntity) -> LeaveInterval {
    let leave_type = entity
        .leave_type
        .parse::<LeaveType>()
        .unwrap_or(LeaveType::Vacation);
    let status = entity
        .status
        .parse::<LeaveStatus>()
        .unwrap_or(LeaveStatus::Pending);

    LeaveInterval {
        id: entity.id,
        user_id: entity.user_id,
        leave_type,
        start_date: entity.start_date,
        end_date: entity.end_date,
        status,
        reason: entity.reason,
        reviewed_by: entity.reviewed_by,
        reviewed_at: entity.reviewed_at,
        approved_by: entity.approved_by,
        approved_at: entity.approved_at,
        rejection_reason: entity.rejection_reason,
        documentation_ref: entity.documentation_ref,
        created_at: entity.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entity_to_domain_conversion() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let entity = LeaveRequestEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            leave_type: "sick_leave".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 7, 8).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 10).unwrap(),
            status: "approved".to_string(),
            reason: Some("Flu".to_string()),
            reviewed_by: Some(Uuid::new_v4()),
            reviewed_at: Some(now),
            approved_by: Some(Uuid::new_v4()),
            approved_at: Some(now),
            rejection_reason: None,
            documentation_ref: Some("sick-note-2024-07.pdf".to_string()),
            created_at: now,
            updated_at: now,
        };

        let leave = entity_to_domain(entity);

        assert_eq!(leave.leave_type, LeaveType::SickLeave);
        assert_eq!(leave.status, LeaveStatus::Approved);
        assert!(leave.is_active());
        assert_eq!(leave.business_days(), 3);
    }
}
