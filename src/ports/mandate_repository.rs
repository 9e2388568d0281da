//! Persistence port for mandates.

use async_trait::async_trait;

use crate::domain::billing::Mandate;
use crate::domain::foundation::{ApplicationId, MandateId, StorageError};

/// Repository for [`Mandate`] rows keyed by the gateway id.
///
/// `upsert` is the only write: mandate state is always a full mirror of
/// gateway detail, so insert-or-overwrite (last write wins) is the
/// correct persistence shape.
#[async_trait]
pub trait MandateRepository: Send + Sync {
    /// Inserts or overwrites the mandate row.
    async fn upsert(&self, mandate: &Mandate) -> Result<(), StorageError>;

    /// Looks up by gateway id.
    async fn find_by_id(&self, id: &MandateId) -> Result<Option<Mandate>, StorageError>;

    /// Returns the most recently created mandate for an application —
    /// the "current" one; earlier mandates are history.
    async fn find_latest_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<Mandate>, StorageError>;
}
