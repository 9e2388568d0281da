//! Persistence port for payments.

use async_trait::async_trait;

use crate::domain::billing::Payment;
use crate::domain::foundation::{MandateId, PaymentId, StorageError};

/// Repository for [`Payment`] rows keyed by the gateway id.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Inserts or overwrites the payment row (last write wins).
    async fn upsert(&self, payment: &Payment) -> Result<(), StorageError>;

    /// Looks up by gateway id.
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, StorageError>;

    /// Lists payments collected against a mandate, newest first.
    async fn list_for_mandate(&self, mandate_id: &MandateId)
        -> Result<Vec<Payment>, StorageError>;
}
