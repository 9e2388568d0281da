use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::billing::Payment;
use crate::domain::foundation::{MandateId, PaymentId, StorageError};
use crate::ports::PaymentRepository;

/// In-memory [`PaymentRepository`].
#[derive(Default)]
pub struct InMemoryPayments {
    rows: Mutex<Vec<Payment>>,
}

impl InMemoryPayments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: whether anything has been stored.
    pub fn is_empty(&self) -> bool {
        self.rows.lock().map(|rows| rows.is_empty()).unwrap_or(true)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Payment>>, StorageError> {
        self.rows
            .lock()
            .map_err(|_| StorageError::new("payment store poisoned"))
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPayments {
    async fn upsert(&self, payment: &Payment) -> Result<(), StorageError> {
        let mut rows = self.lock()?;
        match rows.iter_mut().find(|row| row.id == payment.id) {
            Some(row) => *row = payment.clone(),
            None => rows.push(payment.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, StorageError> {
        Ok(self.lock()?.iter().find(|row| row.id == *id).cloned())
    }

    async fn list_for_mandate(
        &self,
        mandate_id: &MandateId,
    ) -> Result<Vec<Payment>, StorageError> {
        Ok(self
            .lock()?
            .iter()
            .rev()
            .filter(|row| row.mandate_id.as_ref() == Some(mandate_id))
            .cloned()
            .collect())
    }
}
