//! Postgres-backed [`PaymentRepository`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::domain::billing::{Payment, PaymentStatus};
use crate::domain::foundation::{MandateId, PaymentId, StorageError, Timestamp};
use crate::ports::PaymentRepository;

pub struct PostgresPayments {
    pool: PgPool,
}

impl PostgresPayments {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: String,
    created_at: DateTime<Utc>,
    charge_date: NaiveDate,
    payout_date: Option<NaiveDate>,
    amount: i64,
    currency: String,
    status: String,
    amount_refunded: i64,
    reference: String,
    description: String,
    idempotency_key: String,
    creditor_id: String,
    payout_id: String,
    mandate_id: Option<String>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = StorageError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let mandate_id = row
            .mandate_id
            .map(MandateId::new)
            .transpose()
            .map_err(|err| StorageError::new(err.to_string()))?;
        Ok(Payment {
            id: PaymentId::new(row.id).map_err(|err| StorageError::new(err.to_string()))?,
            created_at: Timestamp::from_datetime(row.created_at),
            charge_date: row.charge_date,
            payout_date: row.payout_date,
            amount: row.amount,
            currency: row.currency,
            status: PaymentStatus::new(row.status),
            amount_refunded: row.amount_refunded,
            reference: row.reference,
            description: row.description,
            idempotency_key: row.idempotency_key,
            creditor_id: row.creditor_id,
            payout_id: row.payout_id,
            mandate_id,
        })
    }
}

const SELECT_COLUMNS: &str = "id, created_at, charge_date, payout_date, amount, currency, \
     status, amount_refunded, reference, description, idempotency_key, creditor_id, \
     payout_id, mandate_id";

#[async_trait]
impl PaymentRepository for PostgresPayments {
    async fn upsert(&self, payment: &Payment) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO gocardless_payments
                (id, created_at, charge_date, payout_date, amount, currency,
                 status, amount_refunded, reference, description,
                 idempotency_key, creditor_id, payout_id, mandate_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO UPDATE
            SET charge_date = EXCLUDED.charge_date,
                payout_date = EXCLUDED.payout_date,
                amount = EXCLUDED.amount,
                currency = EXCLUDED.currency,
                status = EXCLUDED.status,
                amount_refunded = EXCLUDED.amount_refunded,
                reference = EXCLUDED.reference,
                description = EXCLUDED.description,
                creditor_id = EXCLUDED.creditor_id,
                payout_id = EXCLUDED.payout_id,
                mandate_id = COALESCE(EXCLUDED.mandate_id,
                                      gocardless_payments.mandate_id)
            "#,
        )
        .bind(payment.id.as_str())
        .bind(payment.created_at.as_datetime())
        .bind(payment.charge_date)
        .bind(payment.payout_date)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(payment.status.as_str())
        .bind(payment.amount_refunded)
        .bind(&payment.reference)
        .bind(&payment.description)
        .bind(&payment.idempotency_key)
        .bind(&payment.creditor_id)
        .bind(&payment.payout_id)
        .bind(payment.mandate_id.as_ref().map(MandateId::as_str))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, StorageError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM gocardless_payments WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;
        row.map(Payment::try_from).transpose()
    }

    async fn list_for_mandate(
        &self,
        mandate_id: &MandateId,
    ) -> Result<Vec<Payment>, StorageError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM gocardless_payments \
             WHERE mandate_id = $1 ORDER BY created_at DESC"
        ))
        .bind(mandate_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| StorageError::new(err.to_string()))?;
        rows.into_iter().map(Payment::try_from).collect()
    }
}
