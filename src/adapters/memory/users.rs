use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{StorageError, UserId};
use crate::ports::{UserDirectory, UserProfile};

/// In-memory [`UserDirectory`], seeded through [`put`](Self::put).
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<UserProfile>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, profile: UserProfile) {
        if let Ok(mut rows) = self.rows.lock() {
            rows.push(profile);
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUsers {
    async fn get(&self, user_id: &UserId) -> Result<Option<UserProfile>, StorageError> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| StorageError::new("user store poisoned"))?;
        Ok(rows.iter().find(|row| row.user_id == *user_id).cloned())
    }
}
