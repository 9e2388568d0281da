//! Outbound notification port.
//!
//! Email delivery is always a side effect of an already-persisted state
//! transition: callers log failures and carry on, they never roll back.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::Fee;
use crate::domain::membership::ApplicationStatus;

use super::UserProfile;

/// Request to the approver: a new application awaits a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequestEmail {
    pub applicant: UserProfile,
    pub fee: Fee,
    pub statement: String,
    /// One-time links keyed by the application's session token.
    pub approve_url: String,
    pub reject_url: String,
}

/// Notification to the applicant: the decision has been made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionEmail {
    pub applicant: UserProfile,
    pub fee: Fee,
    pub status: ApplicationStatus,
}

/// Email delivery failure. Never fatal to the primary operation.
#[derive(Debug, Clone, Error)]
#[error("email delivery failed: {0}")]
pub struct EmailError(String);

impl EmailError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Port for the two notification templates the workflow sends.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Emails the designated approver with approve/reject links.
    async fn send_approval_request(&self, email: &ApprovalRequestEmail) -> Result<(), EmailError>;

    /// Emails the applicant with the approval/rejection outcome.
    async fn send_decision(&self, email: &DecisionEmail) -> Result<(), EmailError>;
}
