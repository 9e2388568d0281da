//! SubmitApplicationHandler - takes in a new supporter application.

use std::sync::Arc;

use crate::domain::foundation::{Fee, UserId};
use crate::domain::membership::{MembershipApplication, MembershipError};
use crate::ports::ApplicationRepository;

/// Command to submit a supporter membership application.
#[derive(Debug, Clone)]
pub struct SubmitApplicationCommand {
    pub user_id: UserId,
    pub fee: Fee,
    pub statement: String,
}

/// Creates and stores a new Pending application.
pub struct SubmitApplicationHandler {
    applications: Arc<dyn ApplicationRepository>,
}

impl SubmitApplicationHandler {
    pub fn new(applications: Arc<dyn ApplicationRepository>) -> Self {
        Self { applications }
    }

    /// # Errors
    ///
    /// `FeeBelowMinimum` when the offered fee is under the accepted
    /// floor; storage errors pass through.
    pub async fn handle(
        &self,
        command: SubmitApplicationCommand,
    ) -> Result<MembershipApplication, MembershipError> {
        if command.fee < Fee::MINIMUM {
            return Err(MembershipError::FeeBelowMinimum {
                minimum: Fee::MINIMUM,
                given: command.fee,
            });
        }

        let application =
            MembershipApplication::new(command.user_id, command.fee, command.statement);
        self.applications.save(&application).await?;

        tracing::info!(
            application_id = %application.id,
            user_id = %application.user_id,
            fee = %application.fee,
            "membership application submitted"
        );

        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryApplications;
    use crate::domain::membership::ApplicationStatus;

    fn command(fee: &str) -> SubmitApplicationCommand {
        SubmitApplicationCommand {
            user_id: UserId::new(),
            fee: Fee::parse(fee).unwrap(),
            statement: "I maintain the CNC router".to_string(),
        }
    }

    #[tokio::test]
    async fn stores_a_pending_application() {
        let applications = Arc::new(InMemoryApplications::new());
        let handler = SubmitApplicationHandler::new(applications.clone());

        let application = handler.handle(command("25.00")).await.unwrap();
        assert_eq!(application.status, ApplicationStatus::Pending);

        let stored = applications
            .find_by_id(&application.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.fee, Fee::parse("25.00").unwrap());
    }

    #[tokio::test]
    async fn rejects_a_fee_below_the_minimum() {
        let applications = Arc::new(InMemoryApplications::new());
        let handler = SubmitApplicationHandler::new(applications.clone());

        let err = handler.handle(command("9.99")).await.unwrap_err();
        assert!(matches!(err, MembershipError::FeeBelowMinimum { .. }));
    }

    #[tokio::test]
    async fn accepts_a_fee_exactly_at_the_minimum() {
        let applications = Arc::new(InMemoryApplications::new());
        let handler = SubmitApplicationHandler::new(applications);

        assert!(handler.handle(command("10.00")).await.is_ok());
    }
}
