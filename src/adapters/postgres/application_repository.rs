//! Postgres-backed [`ApplicationRepository`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    ApplicationId, Fee, SessionToken, StorageError, Timestamp, UserId,
};
use crate::domain::membership::{ApplicationStatus, MembershipApplication};
use crate::ports::ApplicationRepository;

pub struct PostgresApplications {
    pool: PgPool,
}

impl PostgresApplications {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    fee_pence: i64,
    statement: String,
    created_at: DateTime<Utc>,
    started_at: Option<NaiveDate>,
    expired_at: Option<NaiveDate>,
    approval_request_count: i32,
    redirect_flow_id: String,
    session_token: String,
}

impl TryFrom<ApplicationRow> for MembershipApplication {
    type Error = StorageError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(MembershipApplication {
            id: ApplicationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            status: row
                .status
                .parse::<ApplicationStatus>()
                .map_err(StorageError::new)?,
            fee: Fee::from_pence(row.fee_pence)
                .map_err(|err| StorageError::new(err.to_string()))?,
            statement: row.statement,
            created_at: Timestamp::from_datetime(row.created_at),
            started_at: row.started_at,
            expired_at: row.expired_at,
            approval_request_count: u32::try_from(row.approval_request_count)
                .map_err(|_| StorageError::new("negative approval_request_count"))?,
            redirect_flow_id: row.redirect_flow_id,
            session_token: SessionToken::parse(&row.session_token)
                .map_err(|err| StorageError::new(err.to_string()))?,
        })
    }
}

const SELECT_COLUMNS: &str = "id, user_id, status, fee_pence, statement, created_at, \
     started_at, expired_at, approval_request_count, redirect_flow_id, session_token";

#[async_trait]
impl ApplicationRepository for PostgresApplications {
    async fn save(&self, application: &MembershipApplication) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO membership_applications
                (id, user_id, status, fee_pence, statement, created_at,
                 started_at, expired_at, approval_request_count,
                 redirect_flow_id, session_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(application.user_id.as_uuid())
        .bind(application.status.as_str())
        .bind(application.fee.pence())
        .bind(&application.statement)
        .bind(application.created_at.as_datetime())
        .bind(application.started_at)
        .bind(application.expired_at)
        .bind(application.approval_request_count as i32)
        .bind(&application.redirect_flow_id)
        .bind(application.session_token.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;
        Ok(())
    }

    async fn update(&self, application: &MembershipApplication) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE membership_applications
            SET status = $2,
                started_at = $3,
                expired_at = $4,
                approval_request_count = $5,
                redirect_flow_id = $6,
                session_token = $7
            WHERE id = $1
            "#,
        )
        .bind(application.id.as_uuid())
        .bind(application.status.as_str())
        .bind(application.started_at)
        .bind(application.expired_at)
        .bind(application.approval_request_count as i32)
        .bind(&application.redirect_flow_id)
        .bind(application.session_token.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::new("update of unknown application"));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<MembershipApplication>, StorageError> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM membership_applications WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;
        row.map(MembershipApplication::try_from).transpose()
    }

    async fn find_by_session_token(
        &self,
        token: &SessionToken,
    ) -> Result<Option<MembershipApplication>, StorageError> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM membership_applications WHERE session_token = $1"
        ))
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;
        row.map(MembershipApplication::try_from).transpose()
    }

    async fn find_latest_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<MembershipApplication>, StorageError> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM membership_applications \
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;
        row.map(MembershipApplication::try_from).transpose()
    }
}
