//! Audit entry repository for database operations.
//!
//! The audit trail is append-only: this repository exposes no update path,
//! and the only delete is the batched retention sweep. Writes that must be
//! atomic with a business change go through [`insert_entry`] bound to the
//! caller's transaction.

use domain::models::{
    AuditAction, AuditEntry, AuditResourceType, CreateAuditEntryInput, ListAuditEntriesQuery,
    RequestOrigin,
};
use sqlx::{PgConnection, PgPool};
use std::net::IpAddr;
use std::str::FromStr;
use uuid::Uuid;

use crate::entities::AuditEntryEntity;
use crate::metrics::QueryTimer;

/// Helper struct for building dynamic WHERE clauses from audit filters.
/// Tracks conditions and parameter positions to avoid code duplication.
struct AuditFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl AuditFilterBuilder {
    /// Build filter conditions from a query.
    fn build(query: &ListAuditEntriesQuery) -> Self {
        let mut conditions = vec!["TRUE".to_string()];
        let mut param_count = 0;

        if query.actor_id.is_some() {
            param_count += 1;
            conditions.push(format!("actor_id = ${}", param_count));
        }

        if query.action.is_some() {
            param_count += 1;
            conditions.push(format!("action = ${}", param_count));
        }

        if query.resource_type.is_some() {
            param_count += 1;
            conditions.push(format!("resource_type = ${}", param_count));
        }

        if query.resource_id.is_some() {
            param_count += 1;
            conditions.push(format!("resource_id = ${}", param_count));
        }

        if query.from.is_some() {
            param_count += 1;
            conditions.push(format!("timestamp >= ${}", param_count));
        }

        if query.to.is_some() {
            param_count += 1;
            conditions.push(format!("timestamp <= ${}", param_count));
        }

        Self {
            conditions,
            param_count,
        }
    }

    fn where_clause(&self) -> String {
        self.conditions.join(" AND ")
    }

    fn param_count(&self) -> i32 {
        self.param_count
    }
}

/// Macro to bind query filter parameters to a SQLx builder.
/// This avoids code duplication for binding optional query parameters.
macro_rules! bind_query_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref actor_id) = $query.actor_id {
            b = b.bind(actor_id);
        }
        if let Some(ref action) = $query.action {
            b = b.bind(action);
        }
        if let Some(ref resource_type) = $query.resource_type {
            b = b.bind(resource_type);
        }
        if let Some(ref resource_id) = $query.resource_id {
            b = b.bind(resource_id);
        }
        if let Some(ref from) = $query.from {
            b = b.bind(from);
        }
        if let Some(ref to) = $query.to {
            b = b.bind(to);
        }
        b
    }};
}

const INSERT_ENTRY_SQL: &str = r#"
    INSERT INTO audit_entries (
        actor_id, action, resource_type, resource_id,
        previous_state, new_state, note, ip_address, user_agent
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8::inet, $9)
    RETURNING id, actor_id, action, resource_type, resource_id, seq, timestamp,
              previous_state, new_state, note, ip_address::text, user_agent, created_at
"#;

/// Append one audit entry on the given connection.
///
/// Bound to a caller-supplied connection so business repositories can issue
/// the entity write and the audit write inside one transaction: if this
/// insert fails, the surrounding transaction rolls back and the business
/// change never commits.
pub async fn insert_entry(
    conn: &mut PgConnection,
    input: &CreateAuditEntryInput,
) -> Result<AuditEntry, sqlx::Error> {
    let (ip_address, user_agent) = match &input.origin {
        Some(origin) => (
            origin.ip_address.map(|ip| ip.to_string()),
            origin.user_agent.clone(),
        ),
        None => (None, None),
    };

    let entity = sqlx::query_as::<_, AuditEntryEntity>(INSERT_ENTRY_SQL)
        .bind(input.actor_id)
        .bind(input.action.to_string())
        .bind(input.resource_type.to_string())
        .bind(input.resource_id)
        .bind(&input.previous_state)
        .bind(&input.new_state)
        .bind(&input.note)
        .bind(ip_address)
        .bind(user_agent)
        .fetch_one(conn)
        .await?;

    Ok(entity_to_domain(entity))
}

/// Repository for audit entry database operations.
#[derive(Clone)]
pub struct AuditEntryRepository {
    pool: PgPool,
}

impl AuditEntryRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a new audit entry as its own durable write.
    ///
    /// The entry is committed when this returns Ok. Two calls with identical
    /// arguments create two distinct entries; appends are never merged.
    pub async fn append(&self, input: &CreateAuditEntryInput) -> Result<AuditEntry, sqlx::Error> {
        let timer = QueryTimer::new("append_audit_entry");
        let mut conn = self.pool.acquire().await?;
        let entry = insert_entry(&mut conn, input).await?;
        timer.record();
        Ok(entry)
    }

    /// Find an audit entry by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditEntry>, sqlx::Error> {
        let timer = QueryTimer::new("find_audit_entry_by_id");
        let entity = sqlx::query_as::<_, AuditEntryEntity>(
            r#"
            SELECT id, actor_id, action, resource_type, resource_id, seq, timestamp,
                   previous_state, new_state, note, ip_address::text, user_agent, created_at
            FROM audit_entries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        Ok(entity.map(entity_to_domain))
    }

    /// List audit entries with pagination and filtering, newest first.
    pub async fn list(
        &self,
        query: &ListAuditEntriesQuery,
    ) -> Result<(Vec<AuditEntry>, i64), sqlx::Error> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
        let offset = ((page - 1) * per_page) as i64;

        let filter = AuditFilterBuilder::build(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_query = format!("SELECT COUNT(*) FROM audit_entries WHERE {}", where_clause);
        let count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        let count_builder = bind_query_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_query = format!(
            r#"
            SELECT id, actor_id, action, resource_type, resource_id, seq, timestamp,
                   previous_state, new_state, note, ip_address::text, user_agent, created_at
            FROM audit_entries
            WHERE {}
            ORDER BY timestamp DESC, seq DESC
            LIMIT ${} OFFSET ${}
            "#,
            where_clause,
            param_count + 1,
            param_count + 2
        );

        let list_builder = sqlx::query_as::<_, AuditEntryEntity>(&list_query);
        let list_builder = bind_query_filters!(list_builder, query);
        let entities = list_builder
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let entries = entities.into_iter().map(entity_to_domain).collect();

        Ok((entries, total))
    }

    /// Full history of one resource in write order.
    ///
    /// The `(timestamp, seq)` ordering is total per resource: timestamps are
    /// non-decreasing and the identity column breaks ties by insertion order.
    pub async fn list_by_resource(
        &self,
        resource_type: AuditResourceType,
        resource_id: Uuid,
    ) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let timer = QueryTimer::new("list_audit_entries_by_resource");
        let entities = sqlx::query_as::<_, AuditEntryEntity>(
            r#"
            SELECT id, actor_id, action, resource_type, resource_id, seq, timestamp,
                   previous_state, new_state, note, ip_address::text, user_agent, created_at
            FROM audit_entries
            WHERE resource_type = $1 AND resource_id = $2
            ORDER BY timestamp, seq
            "#,
        )
        .bind(resource_type.to_string())
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(entities.into_iter().map(entity_to_domain).collect())
    }

    /// Count all audit entries.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_entries")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Delete entries older than the retention horizon, in batches so the
    /// sweep never holds a long lock or blocks concurrent appends.
    ///
    /// This is the sole deletion path for audit entries and is not itself
    /// audited.
    pub async fn delete_older_than(
        &self,
        retention_days: u32,
        batch_size: i64,
    ) -> Result<u64, sqlx::Error> {
        let mut total_deleted: u64 = 0;

        loop {
            let result = sqlx::query(
                r#"
                WITH to_delete AS (
                    SELECT id FROM audit_entries
                    WHERE timestamp < NOW() - ($1 || ' days')::INTERVAL
                    LIMIT $2
                )
                DELETE FROM audit_entries
                WHERE id IN (SELECT id FROM to_delete)
                "#,
            )
            .bind(retention_days as i32)
            .bind(batch_size)
            .execute(&self.pool)
            .await?;

            let deleted = result.rows_affected();
            total_deleted += deleted;

            if deleted < batch_size as u64 {
                break;
            }
            tracing::debug!(deleted, "Audit retention batch deleted, continuing sweep");

            // Yield between batches so appends are never starved
            tokio::task::yield_now().await;
        }

        Ok(total_deleted)
    }
}

/// Convert entity to domain model.
fn entity_to_domain(entity: AuditEntryEntity) -> AuditEntry {
    let action = entity
        .action
        .parse::<AuditAction>()
        .expect("AuditAction parsing is infallible");
    let resource_type = entity
        .resource_type
        .parse::<AuditResourceType>()
        .unwrap_or(AuditResourceType::User);

    let ip_address = entity
        .ip_address
        .as_deref()
        .and_then(|s| IpAddr::from_str(s).ok());
    let origin = if ip_address.is_some() || entity.user_agent.is_some() {
        Some(RequestOrigin::new(ip_address, entity.user_agent))
    } else {
        None
    };

    AuditEntry {
        id: entity.id,
        actor_id: entity.actor_id,
        action,
        resource_type,
        resource_id: entity.resource_id,
        seq: entity.seq,
        timestamp: entity.timestamp,
        previous_state: entity.previous_state,
        new_state: entity.new_state,
        note: entity.note,
        origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_entity_to_domain_conversion() {
        let now = Utc::now();
        let entity = AuditEntryEntity {
            id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            action: "approve".to_string(),
            resource_type: "time_entry".to_string(),
            resource_id: Uuid::new_v4(),
            seq: 7,
            timestamp: now,
            previous_state: None,
            new_state: Some(serde_json::json!({ "is_approved": true })),
            note: Some("Time entry approved".to_string()),
            ip_address: Some("192.168.1.1".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            created_at: now,
        };

        let entry = entity_to_domain(entity);

        assert_eq!(entry.action, AuditAction::Approve);
        assert_eq!(entry.resource_type, AuditResourceType::TimeEntry);
        assert_eq!(entry.seq, 7);
        let origin = entry.origin.unwrap();
        assert_eq!(origin.ip_address.unwrap().to_string(), "192.168.1.1");
        assert_eq!(origin.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_entity_to_domain_keeps_unknown_action() {
        let now = Utc::now();
        let entity = AuditEntryEntity {
            id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            action: "bulk_import".to_string(),
            resource_type: "user".to_string(),
            resource_id: Uuid::new_v4(),
            seq: 1,
            timestamp: now,
            previous_state: None,
            new_state: None,
            note: None,
            ip_address: None,
            user_agent: None,
            created_at: now,
        };

        let entry = entity_to_domain(entity);

        assert_eq!(entry.action, AuditAction::Other("bulk_import".to_string()));
        assert!(entry.origin.is_none());
    }

    #[test]
    fn test_filter_builder_no_filters() {
        let query = ListAuditEntriesQuery::default();
        let filter = AuditFilterBuilder::build(&query);
        assert_eq!(filter.where_clause(), "TRUE");
        assert_eq!(filter.param_count(), 0);
    }

    #[test]
    fn test_filter_builder_positions_parameters() {
        let query = ListAuditEntriesQuery {
            actor_id: Some(Uuid::new_v4()),
            resource_type: Some("time_entry".to_string()),
            from: Some(Utc::now()),
            ..Default::default()
        };
        let filter = AuditFilterBuilder::build(&query);
        assert_eq!(
            filter.where_clause(),
            "TRUE AND actor_id = $1 AND resource_type = $2 AND timestamp >= $3"
        );
        assert_eq!(filter.param_count(), 3);
    }
}
