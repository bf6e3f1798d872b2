//! User repository for database operations.

use domain::models::User;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

const SELECT_COLUMNS: &str = "id, email, full_name, is_active, created_at, updated_at";

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let entity =
            sqlx::query_as::<_, UserEntity>(&format!("SELECT {} FROM users WHERE id = $1", SELECT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        timer.record();

        Ok(entity.map(entity_to_domain))
    }

    /// All active users, for roster-wide reporting.
    pub async fn find_active(&self) -> Result<Vec<User>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_users");
        let entities = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE is_active = TRUE ORDER BY email",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(entities.into_iter().map(entity_to_domain).collect())
    }
}

/// Convert entity to domain model.
fn entity_to_domain(entity: UserEntity) -> User {
    User {
        id: entity.id,
        email: entity.email,
        full_name: entity.full_name,
        is_active: entity.is_active,
        created_at: entity.created_at,
    }
}
