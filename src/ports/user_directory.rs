//! Read-only port to the user account system.
//!
//! User registration and authentication live outside this service; the
//! membership workflow only needs a name and email for gateway prefill
//! and notifications.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StorageError, UserId};

/// The slice of a user account the membership workflow consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserProfile {
    /// Display name used in email subjects.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Lookup port into the account system.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get(&self, user_id: &UserId) -> Result<Option<UserProfile>, StorageError>;
}
