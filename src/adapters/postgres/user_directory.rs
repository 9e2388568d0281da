//! Postgres-backed [`UserDirectory`].
//!
//! Read-only: user accounts are managed elsewhere, this service only
//! needs names and addresses for emails and gateway prefill.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{StorageError, UserId};
use crate::ports::{UserDirectory, UserProfile};

pub struct PostgresUsers {
    pool: PgPool,
}

impl PostgresUsers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            user_id: UserId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        }
    }
}

#[async_trait]
impl UserDirectory for PostgresUsers {
    async fn get(&self, user_id: &UserId) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name, email FROM users WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;
        Ok(row.map(UserProfile::from))
    }
}
