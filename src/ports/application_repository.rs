//! Persistence port for the membership application aggregate.

use async_trait::async_trait;

use crate::domain::foundation::{ApplicationId, SessionToken, StorageError, UserId};
use crate::domain::membership::MembershipApplication;

/// Repository for [`MembershipApplication`] aggregates.
///
/// Applications are append-mostly: they are never hard-deleted, and a
/// user may accumulate several over time (the latest one is the current
/// attempt).
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Persists a new application.
    async fn save(&self, application: &MembershipApplication) -> Result<(), StorageError>;

    /// Updates an existing application (status, tokens, billing window).
    async fn update(&self, application: &MembershipApplication) -> Result<(), StorageError>;

    /// Looks up by primary key.
    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<MembershipApplication>, StorageError>;

    /// Looks up by the session token embedded in redirect callbacks and
    /// approval links.
    async fn find_by_session_token(
        &self,
        token: &SessionToken,
    ) -> Result<Option<MembershipApplication>, StorageError>;

    /// Returns the user's most recently created application, if any.
    async fn find_latest_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<MembershipApplication>, StorageError>;
}
