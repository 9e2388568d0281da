use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{ApplicationId, SessionToken, StorageError, UserId};
use crate::domain::membership::MembershipApplication;
use crate::ports::ApplicationRepository;

/// In-memory [`ApplicationRepository`].
#[derive(Default)]
pub struct InMemoryApplications {
    rows: Mutex<Vec<MembershipApplication>>,
}

impl InMemoryApplications {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<MembershipApplication>>, StorageError> {
        self.rows
            .lock()
            .map_err(|_| StorageError::new("application store poisoned"))
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplications {
    async fn save(&self, application: &MembershipApplication) -> Result<(), StorageError> {
        self.lock()?.push(application.clone());
        Ok(())
    }

    async fn update(&self, application: &MembershipApplication) -> Result<(), StorageError> {
        let mut rows = self.lock()?;
        match rows.iter_mut().find(|row| row.id == application.id) {
            Some(row) => {
                *row = application.clone();
                Ok(())
            }
            None => Err(StorageError::new("update of unknown application")),
        }
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<MembershipApplication>, StorageError> {
        Ok(self.lock()?.iter().find(|row| row.id == *id).cloned())
    }

    async fn find_by_session_token(
        &self,
        token: &SessionToken,
    ) -> Result<Option<MembershipApplication>, StorageError> {
        Ok(self
            .lock()?
            .iter()
            .find(|row| row.session_token == *token)
            .cloned())
    }

    async fn find_latest_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<MembershipApplication>, StorageError> {
        Ok(self
            .lock()?
            .iter()
            .rev()
            .find(|row| row.user_id == *user_id)
            .cloned())
    }
}
