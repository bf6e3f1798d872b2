//! Time entry repository for database operations.
//!
//! Every state-changing operation here writes the entity change and its
//! audit entry inside one transaction. A failed audit write rolls back the
//! business change, so a committed change is always audited.

use chrono::Utc;
use domain::models::{
    CreateWorkIntervalInput, ReportPeriod, RequestOrigin, UpdateWorkIntervalInput, WorkInterval,
};
use domain::services::audit_helpers;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TimeEntryEntity;
use crate::metrics::QueryTimer;
use crate::repositories::audit_entry::insert_entry;

const SELECT_COLUMNS: &str = "id, user_id, start_time, end_time, description, is_manual_entry, \
     is_approved, approved_by, approved_at, audit_note, audit_change_type, created_at, updated_at";

/// Repository for time entry database operations.
#[derive(Clone)]
pub struct TimeEntryRepository {
    pool: PgPool,
}

impl TimeEntryRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a time entry by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<WorkInterval>, sqlx::Error> {
        let timer = QueryTimer::new("find_time_entry_by_id");
        let entity = sqlx::query_as::<_, TimeEntryEntity>(&format!(
            "SELECT {} FROM time_entries WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        Ok(entity.map(entity_to_domain))
    }

    /// Time entries for a user that touch the given period, ordered by
    /// start time. An entry qualifies when its start or its end falls
    /// within the period bounds.
    pub async fn find_by_user_and_period(
        &self,
        user_id: Uuid,
        period: &ReportPeriod,
    ) -> Result<Vec<WorkInterval>, sqlx::Error> {
        let timer = QueryTimer::new("find_time_entries_by_user_and_period");
        let entities = sqlx::query_as::<_, TimeEntryEntity>(&format!(
            r#"
            SELECT {}
            FROM time_entries
            WHERE user_id = $1
              AND (
                  (start_time >= $2 AND start_time <= $3)
                  OR (end_time >= $2 AND end_time <= $3)
              )
            ORDER BY start_time
            "#,
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(period.start)
        .bind(period.end)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(entities.into_iter().map(entity_to_domain).collect())
    }

    /// Manual entries still awaiting approval, newest first.
    pub async fn find_pending_approval(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkInterval>, sqlx::Error> {
        let timer = QueryTimer::new("find_time_entries_pending_approval");
        let entities = sqlx::query_as::<_, TimeEntryEntity>(&format!(
            r#"
            SELECT {}
            FROM time_entries
            WHERE is_manual_entry = TRUE AND is_approved = FALSE
            ORDER BY created_at DESC
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

    /// Create a time entry and its audit record in one transaction.
    ///
    /// Non-manual entries start approved; manual entries await an approver.
    pub async fn create(
        &self,
        input: &CreateWorkIntervalInput,
        actor_id: Uuid,
        origin: Option<RequestOrigin>,
    ) -> Result<WorkInterval, sqlx::Error> {
        let timer = QueryTimer::new("create_time_entry");
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, TimeEntryEntity>(&format!(
            r#"
            INSERT INTO time_entries (user_id, start_time, end_time, description, is_manual_entry, is_approved)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(input.user_id)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.description)
        .bind(input.is_manual_entry)
        .bind(input.initial_approval())
        .fetch_one(&mut *tx)
        .await?;

        let interval = entity_to_domain(entity);
        let mut audit = audit_helpers::time_entry_created(actor_id, &interval);
        audit.origin = origin;
        insert_entry(&mut tx, &audit).await?;

        tx.commit().await?;
        timer.record();
        Ok(interval)
    }

    /// Apply a partial update and audit the before/after snapshots in one
    /// transaction. Turning an automatic entry into a manual one resets its
    /// approval.
    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateWorkIntervalInput,
        actor_id: Uuid,
        origin: Option<RequestOrigin>,
    ) -> Result<Option<WorkInterval>, sqlx::Error> {
        let timer = QueryTimer::new("update_time_entry");
        let mut tx = self.pool.begin().await?;

        let Some(current) = sqlx::query_as::<_, TimeEntryEntity>(&format!(
            "SELECT {} FROM time_entries WHERE id = $1 FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };
        let before = entity_to_domain(current);

        let start_time = input.start_time.unwrap_or(before.start_time);
        let end_time = input.end_time.or(before.end_time);
        let description = input.description.clone().or_else(|| before.description.clone());
        let is_manual_entry = input.is_manual_entry.unwrap_or(before.is_manual_entry);

        let (is_approved, approved_by, approved_at) = if input.resets_approval(&before) {
            (false, None, None)
        } else {
            (before.is_approved, before.approved_by, before.approved_at)
        };

        let entity = sqlx::query_as::<_, TimeEntryEntity>(&format!(
            r#"
            UPDATE time_entries
            SET start_time = $2, end_time = $3, description = $4, is_manual_entry = $5,
                is_approved = $6, approved_by = $7, approved_at = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(start_time)
        .bind(end_time)
        .bind(&description)
        .bind(is_manual_entry)
        .bind(is_approved)
        .bind(approved_by)
        .bind(approved_at)
        .fetch_one(&mut *tx)
        .await?;

        let after = entity_to_domain(entity);
        let mut audit = audit_helpers::time_entry_updated(actor_id, &before, &after);
        audit.origin = origin;
        insert_entry(&mut tx, &audit).await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(after))
    }

    /// Hard-delete a time entry. The previous-state snapshot is written in
    /// the same transaction as the delete, so a committed delete always has
    /// its snapshot on record.
    pub async fn delete(
        &self,
        id: Uuid,
        actor_id: Uuid,
        origin: Option<RequestOrigin>,
    ) -> Result<Option<WorkInterval>, sqlx::Error> {
        let timer = QueryTimer::new("delete_time_entry");
        let mut tx = self.pool.begin().await?;

        let Some(current) = sqlx::query_as::<_, TimeEntryEntity>(&format!(
            "SELECT {} FROM time_entries WHERE id = $1 FOR UPDATE",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };
        let deleted = entity_to_domain(current);

        let mut audit = audit_helpers::time_entry_deleted(actor_id, &deleted);
        audit.origin = origin;
        insert_entry(&mut tx, &audit).await?;

        sqlx::query("DELETE FROM time_entries WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(deleted))
    }

    /// Approve a manual entry, stamping approver and time, with the audit
    /// record in the same transaction.
    pub async fn approve(
        &self,
        id: Uuid,
        approver_id: Uuid,
        audit_note: Option<&str>,
        origin: Option<RequestOrigin>,
    ) -> Result<Option<WorkInterval>, sqlx::Error> {
        let timer = QueryTimer::new("approve_time_entry");
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, TimeEntryEntity>(&format!(
            r#"
            UPDATE time_entries
            SET is_approved = TRUE, approved_by = $2, approved_at = $3,
                audit_note = $4, audit_change_type = 'approval', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(approver_id)
        .bind(Utc::now())
        .bind(audit_note)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(entity) = entity else {
            return Ok(None);
        };
        let approved = entity_to_domain(entity);

        let mut audit = audit_helpers::time_entry_approved(approver_id, &approved, audit_note);
        audit.origin = origin;
        insert_entry(&mut tx, &audit).await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(approved))
    }
}

/// Convert entity to domain model.
fn entity_to_domain(entity: TimeEntryEntity) -> WorkInterval {
    WorkInterval {
        id: entity.id,
        user_id: entity.user_id,
        start_time: entity.start_time,
        end_time: entity.end_time,
        description: entity.description,
        is_manual_entry: entity.is_manual_entry,
        is_approved: entity.is_approved,
        approved_by: entity.approved_by,
        approved_at: entity.approved_at,
        audit_note: entity.audit_note,
        audit_change_type: entity.audit_change_type,
        created_at: entity.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entity_to_domain_conversion() {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 4, 16, 0, 0).unwrap();
        let entity = TimeEntryEntity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_time: start,
            end_time: Some(end),
            description: Some("On-site shift".to_string()),
            is_manual_entry: true,
            is_approved: false,
            approved_by: None,
            approved_at: None,
            audit_note: None,
            audit_change_type: None,
            created_at: start,
            updated_at: start,
        };

        let interval = entity_to_domain(entity);

        assert!(interval.is_completed());
        assert_eq!(interval.duration_seconds(), Some(8 * 3600));
        assert!(interval.is_manual_entry);
        assert!(!interval.is_approved);
    }
}
