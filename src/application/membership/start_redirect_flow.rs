//! StartRedirectFlowHandler - begins mandate setup at the gateway.

use std::sync::Arc;

use crate::application::PublicUrls;
use crate::domain::foundation::UserId;
use crate::domain::membership::MembershipError;
use crate::ports::{
    ApplicationRepository, CreateRedirectFlowRequest, CustomerPrefill, PaymentGateway,
    UserDirectory,
};

/// Description shown on the gateway's authorization page.
const FLOW_DESCRIPTION: &str = "SpaceFed supporter membership";

/// Starts a gateway-hosted redirect flow for the user's latest
/// application and returns the URL to send their browser to.
///
/// Each call mints a fresh session token, so re-starting the flow
/// invalidates any half-finished earlier attempt.
pub struct StartRedirectFlowHandler {
    applications: Arc<dyn ApplicationRepository>,
    users: Arc<dyn UserDirectory>,
    gateway: Arc<dyn PaymentGateway>,
    urls: PublicUrls,
}

impl StartRedirectFlowHandler {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        users: Arc<dyn UserDirectory>,
        gateway: Arc<dyn PaymentGateway>,
        urls: PublicUrls,
    ) -> Self {
        Self {
            applications,
            users,
            gateway,
            urls,
        }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<String, MembershipError> {
        let mut application = self
            .applications
            .find_latest_by_user(user_id)
            .await?
            .ok_or(MembershipError::ApplicationNotFound)?;

        let profile = self
            .users
            .get(user_id)
            .await?
            .ok_or(MembershipError::UserNotFound)?;

        // Token rotation happens before the gateway call: the token the
        // gateway stores and the one we later persist must be the same.
        let session_token = application.rotate_session_token().clone();

        let flow = self
            .gateway
            .create_redirect_flow(CreateRedirectFlowRequest {
                description: FLOW_DESCRIPTION.to_string(),
                session_token,
                success_redirect_url: self.urls.redirect_flow_success(),
                prefilled_customer: CustomerPrefill {
                    given_name: profile.first_name,
                    family_name: profile.last_name,
                    email: profile.email,
                },
            })
            .await?;

        application.attach_redirect_flow(&flow.id);
        self.applications.update(&application).await?;

        tracing::info!(
            application_id = %application.id,
            redirect_flow_id = %flow.id,
            "redirect flow started"
        );

        Ok(flow.redirect_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gocardless::MockGateway;
    use crate::adapters::memory::{InMemoryApplications, InMemoryUsers};
    use crate::domain::foundation::Fee;
    use crate::domain::membership::MembershipApplication;
    use crate::ports::{GatewayError, UserProfile};

    fn urls() -> PublicUrls {
        PublicUrls::new("https://members.example.org")
    }

    fn profile(user_id: UserId) -> UserProfile {
        UserProfile {
            user_id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.org".to_string(),
        }
    }

    #[tokio::test]
    async fn starts_a_flow_and_stores_the_flow_id_and_new_token() {
        let applications = Arc::new(InMemoryApplications::new());
        let users = Arc::new(InMemoryUsers::new());
        let gateway = Arc::new(MockGateway::new());

        let user_id = UserId::new();
        users.put(profile(user_id));
        let app =
            MembershipApplication::new(user_id, Fee::parse("25.00").unwrap(), "statement");
        let old_token = app.session_token.clone();
        applications.save(&app).await.unwrap();

        let handler =
            StartRedirectFlowHandler::new(applications.clone(), users, gateway.clone(), urls());
        let redirect_url = handler.handle(&user_id).await.unwrap();
        assert!(redirect_url.starts_with("https://"));

        let stored = applications.find_by_id(&app.id).await.unwrap().unwrap();
        assert!(!stored.redirect_flow_id.is_empty());
        assert_ne!(stored.session_token, old_token);

        // the token the gateway saw is the one that was persisted
        let flows = gateway.created_redirect_flows();
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].session_token, stored.session_token);
        assert_eq!(flows[0].prefilled_customer.given_name, "Ada");
        assert_eq!(
            flows[0].success_redirect_url,
            "https://members.example.org/api/membership/redirect-flow/complete"
        );
    }

    #[tokio::test]
    async fn fails_when_the_user_has_no_application() {
        let handler = StartRedirectFlowHandler::new(
            Arc::new(InMemoryApplications::new()),
            Arc::new(InMemoryUsers::new()),
            Arc::new(MockGateway::new()),
            urls(),
        );
        let err = handler.handle(&UserId::new()).await.unwrap_err();
        assert!(matches!(err, MembershipError::ApplicationNotFound));
    }

    #[tokio::test]
    async fn fails_when_the_user_profile_is_missing() {
        let applications = Arc::new(InMemoryApplications::new());
        let user_id = UserId::new();
        applications
            .save(&MembershipApplication::new(
                user_id,
                Fee::parse("25.00").unwrap(),
                "statement",
            ))
            .await
            .unwrap();

        let handler = StartRedirectFlowHandler::new(
            applications,
            Arc::new(InMemoryUsers::new()),
            Arc::new(MockGateway::new()),
            urls(),
        );
        let err = handler.handle(&user_id).await.unwrap_err();
        assert!(matches!(err, MembershipError::UserNotFound));
    }

    #[tokio::test]
    async fn gateway_failure_leaves_the_stored_token_untouched() {
        let applications = Arc::new(InMemoryApplications::new());
        let users = Arc::new(InMemoryUsers::new());
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_next(GatewayError::network("timed out"));

        let user_id = UserId::new();
        users.put(profile(user_id));
        let app =
            MembershipApplication::new(user_id, Fee::parse("25.00").unwrap(), "statement");
        let old_token = app.session_token.clone();
        applications.save(&app).await.unwrap();

        let handler = StartRedirectFlowHandler::new(applications.clone(), users, gateway, urls());
        assert!(handler.handle(&user_id).await.is_err());

        let stored = applications.find_by_id(&app.id).await.unwrap().unwrap();
        assert_eq!(stored.session_token, old_token);
        assert!(stored.redirect_flow_id.is_empty());
    }
}
