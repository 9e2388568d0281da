//! RequestApprovalHandler - emails the approver about a waiting
//! application.

use std::sync::Arc;

use crate::application::PublicUrls;
use crate::domain::membership::{MembershipApplication, MembershipError};
use crate::ports::{ApplicationRepository, ApprovalRequestEmail, Mailer, UserDirectory};

/// Sends the approve/reject email for a pending application.
///
/// Delivery is best-effort: the mandate setup that triggers this has
/// already succeeded, so a mail failure is logged and reported as
/// `false` rather than surfaced to the payer.
pub struct RequestApprovalHandler {
    applications: Arc<dyn ApplicationRepository>,
    users: Arc<dyn UserDirectory>,
    mailer: Arc<dyn Mailer>,
    urls: PublicUrls,
}

impl RequestApprovalHandler {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        users: Arc<dyn UserDirectory>,
        mailer: Arc<dyn Mailer>,
        urls: PublicUrls,
    ) -> Self {
        Self {
            applications,
            users,
            mailer,
            urls,
        }
    }

    /// Returns whether the email went out (and the send count was
    /// bumped).
    pub async fn handle(
        &self,
        application: &mut MembershipApplication,
    ) -> Result<bool, MembershipError> {
        let applicant = self
            .users
            .get(&application.user_id)
            .await?
            .ok_or(MembershipError::UserNotFound)?;

        let email = ApprovalRequestEmail {
            applicant,
            fee: application.fee,
            statement: application.statement.clone(),
            approve_url: self.urls.approve(&application.session_token),
            reject_url: self.urls.reject(&application.session_token),
        };

        if let Err(err) = self.mailer.send_approval_request(&email).await {
            tracing::error!(
                application_id = %application.id,
                error = %err,
                "approval request email failed"
            );
            return Ok(false);
        }

        application.record_approval_request_sent();
        self.applications.update(application).await?;

        tracing::info!(
            application_id = %application.id,
            sent_count = application.approval_request_count,
            "approval request sent"
        );
        Ok(true)
    }
}
