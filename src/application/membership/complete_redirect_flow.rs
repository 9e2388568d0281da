//! CompleteRedirectFlowHandler - turns a finished redirect flow into a
//! stored mandate.

use std::sync::Arc;

use crate::domain::billing::Mandate;
use crate::domain::foundation::SessionToken;
use crate::domain::membership::MembershipError;
use crate::ports::{ApplicationRepository, MandateRepository, PaymentGateway};

/// Command carrying the query parameters the gateway appends to the
/// success redirect.
#[derive(Debug, Clone)]
pub struct CompleteRedirectFlowCommand {
    pub redirect_flow_id: String,
    pub session_token: SessionToken,
}

/// Completes the redirect flow at the gateway and mirrors the resulting
/// mandate, linked to the owning application.
pub struct CompleteRedirectFlowHandler {
    applications: Arc<dyn ApplicationRepository>,
    mandates: Arc<dyn MandateRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CompleteRedirectFlowHandler {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        mandates: Arc<dyn MandateRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            applications,
            mandates,
            gateway,
        }
    }

    /// # Errors
    ///
    /// `ApplicationNotFound` if the token matches nothing (stale link);
    /// gateway rejections (double completion, token mismatch) pass
    /// through as `GatewayRejected`.
    pub async fn handle(
        &self,
        command: CompleteRedirectFlowCommand,
    ) -> Result<Mandate, MembershipError> {
        let application = self
            .applications
            .find_by_session_token(&command.session_token)
            .await?
            .ok_or(MembershipError::ApplicationNotFound)?;

        let completed = self
            .gateway
            .complete_redirect_flow(&command.redirect_flow_id, &application.session_token)
            .await?;

        // The completion response carries only the mandate id; fetch the
        // full detail before mirroring.
        let detail = self.gateway.get_mandate(&completed.mandate_id).await?;

        let mandate = Mandate::from_detail(&detail, Some(application.id));
        self.mandates.upsert(&mandate).await?;

        tracing::info!(
            application_id = %application.id,
            mandate_id = %mandate.id,
            status = %mandate.status,
            "mandate created from redirect flow"
        );

        Ok(mandate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gocardless::MockGateway;
    use crate::adapters::memory::{InMemoryApplications, InMemoryMandates};
    use crate::domain::foundation::Fee;
    use crate::domain::membership::MembershipApplication;
    use crate::ports::{CreateRedirectFlowRequest, CustomerPrefill};

    async fn started_flow(
        applications: &InMemoryApplications,
        gateway: &MockGateway,
    ) -> (MembershipApplication, String) {
        let app = MembershipApplication::new(
            crate::domain::foundation::UserId::new(),
            Fee::parse("25.00").unwrap(),
            "statement",
        );
        applications.save(&app).await.unwrap();

        let flow = gateway
            .create_redirect_flow(CreateRedirectFlowRequest {
                description: "test".to_string(),
                session_token: app.session_token.clone(),
                success_redirect_url: "https://example.org/done".to_string(),
                prefilled_customer: CustomerPrefill {
                    given_name: "Ada".to_string(),
                    family_name: "Lovelace".to_string(),
                    email: "ada@example.org".to_string(),
                },
            })
            .await
            .unwrap();
        (app, flow.id)
    }

    #[tokio::test]
    async fn completion_stores_a_mandate_owned_by_the_application() {
        let applications = Arc::new(InMemoryApplications::new());
        let mandates = Arc::new(InMemoryMandates::new());
        let gateway = Arc::new(MockGateway::new());
        let (app, flow_id) = started_flow(&applications, &gateway).await;

        let handler =
            CompleteRedirectFlowHandler::new(applications, mandates.clone(), gateway);
        let mandate = handler
            .handle(CompleteRedirectFlowCommand {
                redirect_flow_id: flow_id,
                session_token: app.session_token.clone(),
            })
            .await
            .unwrap();

        assert_eq!(mandate.application_id, Some(app.id));
        let stored = mandates.find_by_id(&mandate.id).await.unwrap().unwrap();
        assert!(stored.is_active());
    }

    #[tokio::test]
    async fn unknown_session_token_is_not_found() {
        let handler = CompleteRedirectFlowHandler::new(
            Arc::new(InMemoryApplications::new()),
            Arc::new(InMemoryMandates::new()),
            Arc::new(MockGateway::new()),
        );
        let err = handler
            .handle(CompleteRedirectFlowCommand {
                redirect_flow_id: "RE0001".to_string(),
                session_token: SessionToken::generate(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::ApplicationNotFound));
    }

    #[tokio::test]
    async fn double_completion_is_rejected_by_the_gateway() {
        let applications = Arc::new(InMemoryApplications::new());
        let gateway = Arc::new(MockGateway::new());
        let (app, flow_id) = started_flow(&applications, &gateway).await;

        let handler = CompleteRedirectFlowHandler::new(
            applications,
            Arc::new(InMemoryMandates::new()),
            gateway,
        );
        let command = CompleteRedirectFlowCommand {
            redirect_flow_id: flow_id,
            session_token: app.session_token.clone(),
        };
        handler.handle(command.clone()).await.unwrap();

        let err = handler.handle(command).await.unwrap_err();
        assert!(matches!(err, MembershipError::GatewayRejected { .. }));
    }
}
