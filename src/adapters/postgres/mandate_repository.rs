//! Postgres-backed [`MandateRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{Mandate, MandateStatus};
use crate::domain::foundation::{ApplicationId, MandateId, StorageError, Timestamp};
use crate::ports::MandateRepository;

pub struct PostgresMandates {
    pool: PgPool,
}

impl PostgresMandates {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MandateRow {
    id: String,
    created_at: DateTime<Utc>,
    reference: String,
    status: String,
    creditor_id: String,
    customer_id: String,
    customer_bank_account_id: String,
    application_id: Option<Uuid>,
}

impl TryFrom<MandateRow> for Mandate {
    type Error = StorageError;

    fn try_from(row: MandateRow) -> Result<Self, Self::Error> {
        Ok(Mandate {
            id: MandateId::new(row.id).map_err(|err| StorageError::new(err.to_string()))?,
            created_at: Timestamp::from_datetime(row.created_at),
            reference: row.reference,
            status: MandateStatus::new(row.status),
            creditor_id: row.creditor_id,
            customer_id: row.customer_id,
            customer_bank_account_id: row.customer_bank_account_id,
            application_id: row.application_id.map(ApplicationId::from_uuid),
        })
    }
}

const SELECT_COLUMNS: &str = "id, created_at, reference, status, creditor_id, customer_id, \
     customer_bank_account_id, application_id";

#[async_trait]
impl MandateRepository for PostgresMandates {
    async fn upsert(&self, mandate: &Mandate) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO gocardless_mandates
                (id, created_at, reference, status, creditor_id, customer_id,
                 customer_bank_account_id, application_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE
            SET reference = EXCLUDED.reference,
                status = EXCLUDED.status,
                creditor_id = EXCLUDED.creditor_id,
                customer_id = EXCLUDED.customer_id,
                customer_bank_account_id = EXCLUDED.customer_bank_account_id,
                application_id = COALESCE(EXCLUDED.application_id,
                                          gocardless_mandates.application_id)
            "#,
        )
        .bind(mandate.id.as_str())
        .bind(mandate.created_at.as_datetime())
        .bind(&mandate.reference)
        .bind(mandate.status.as_str())
        .bind(&mandate.creditor_id)
        .bind(&mandate.customer_id)
        .bind(&mandate.customer_bank_account_id)
        .bind(mandate.application_id.as_ref().map(ApplicationId::as_uuid))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &MandateId) -> Result<Option<Mandate>, StorageError> {
        let row = sqlx::query_as::<_, MandateRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM gocardless_mandates WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;
        row.map(Mandate::try_from).transpose()
    }

    async fn find_latest_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<Mandate>, StorageError> {
        let row = sqlx::query_as::<_, MandateRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM gocardless_mandates \
             WHERE application_id = $1 ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(application_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;
        row.map(Mandate::try_from).transpose()
    }
}
