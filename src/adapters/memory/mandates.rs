use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::billing::Mandate;
use crate::domain::foundation::{ApplicationId, MandateId, StorageError};
use crate::ports::MandateRepository;

/// In-memory [`MandateRepository`].
#[derive(Default)]
pub struct InMemoryMandates {
    rows: Mutex<Vec<Mandate>>,
}

impl InMemoryMandates {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Mandate>>, StorageError> {
        self.rows
            .lock()
            .map_err(|_| StorageError::new("mandate store poisoned"))
    }
}

#[async_trait]
impl MandateRepository for InMemoryMandates {
    async fn upsert(&self, mandate: &Mandate) -> Result<(), StorageError> {
        let mut rows = self.lock()?;
        match rows.iter_mut().find(|row| row.id == mandate.id) {
            Some(row) => *row = mandate.clone(),
            None => rows.push(mandate.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &MandateId) -> Result<Option<Mandate>, StorageError> {
        Ok(self.lock()?.iter().find(|row| row.id == *id).cloned())
    }

    async fn find_latest_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<Mandate>, StorageError> {
        Ok(self
            .lock()?
            .iter()
            .rev()
            .find(|row| row.application_id.as_ref() == Some(application_id))
            .cloned())
    }
}
