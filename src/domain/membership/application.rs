//! Membership application aggregate.
//!
//! The aggregate root for supporter membership. Tracks the approval
//! workflow, the chosen fee, the gateway redirect-flow bookkeeping, and
//! the active-membership window stamped when a payment pays out.
//!
//! # Design Decisions
//!
//! - **Money in pence**: the fee is an integer [`Fee`], never a float
//! - **Terminal decisions**: Pending is the only state that accepts
//!   approve/reject; decided applications are immutable audit records
//! - **Fixed-length year**: `expired_at` is always payout date + 365 days

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ApplicationId, Fee, SessionToken, Timestamp, UserId};

use super::{ApplicationStatus, MembershipError};

/// Length of one paid membership term.
pub const MEMBERSHIP_TERM_DAYS: i64 = 365;

/// A supporter membership application and its billing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipApplication {
    /// Unique identifier for this application.
    pub id: ApplicationId,

    /// User who submitted the application.
    pub user_id: UserId,

    /// Approval workflow state.
    pub status: ApplicationStatus,

    /// Annual fee chosen by the applicant.
    pub fee: Fee,

    /// Free-text "why I should be a member" statement.
    pub statement: String,

    /// When the application was submitted.
    pub created_at: Timestamp,

    /// Payout date of the first collected payment.
    pub started_at: Option<NaiveDate>,

    /// End of the paid-up window; membership lapses after this date.
    pub expired_at: Option<NaiveDate>,

    /// How many approval-request emails were successfully sent.
    pub approval_request_count: u32,

    /// Gateway redirect-flow id; blank until a flow is created.
    pub redirect_flow_id: String,

    /// Correlates the redirect callback and the approval links.
    pub session_token: SessionToken,
}

impl MembershipApplication {
    /// Creates a fresh Pending application with a newly minted session
    /// token.
    pub fn new(user_id: UserId, fee: Fee, statement: impl Into<String>) -> Self {
        Self {
            id: ApplicationId::new(),
            user_id,
            status: ApplicationStatus::Pending,
            fee,
            statement: statement.into(),
            created_at: Timestamp::now(),
            started_at: None,
            expired_at: None,
            approval_request_count: 0,
            redirect_flow_id: String::new(),
            session_token: SessionToken::generate(),
        }
    }

    /// Whether the membership is currently active: approved and paid up.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        match self.expired_at {
            Some(expired_at) => self.status == ApplicationStatus::Approved && expired_at > today,
            None => false,
        }
    }

    /// Approves the application.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyDecided` without mutating if the application is no
    /// longer pending — under a concurrent approve/reject race exactly
    /// one caller succeeds.
    pub fn approve(&mut self) -> Result<(), MembershipError> {
        self.decide(ApplicationStatus::Approved)
    }

    /// Rejects the application. Same guard as [`approve`](Self::approve).
    pub fn reject(&mut self) -> Result<(), MembershipError> {
        self.decide(ApplicationStatus::Rejected)
    }

    fn decide(&mut self, decision: ApplicationStatus) -> Result<(), MembershipError> {
        if !self.status.is_pending() {
            return Err(MembershipError::AlreadyDecided {
                status: self.status,
            });
        }
        self.status = decision;
        Ok(())
    }

    /// Records a paid-out payment: stamps the membership window.
    ///
    /// `started_at` becomes the payout date and `expired_at` the payout
    /// date plus a fixed 365-day term. Called again for a renewal
    /// payment, both move forward together.
    pub fn record_payment_received(&mut self, payout_date: NaiveDate) {
        self.started_at = Some(payout_date);
        self.expired_at = Some(payout_date + Duration::days(MEMBERSHIP_TERM_DAYS));
    }

    /// Mints a new session token for a fresh redirect-flow attempt.
    ///
    /// Invalidates any approval links issued under the previous token.
    pub fn rotate_session_token(&mut self) -> &SessionToken {
        self.session_token = SessionToken::generate();
        &self.session_token
    }

    /// Records the gateway redirect-flow id once the flow is created.
    pub fn attach_redirect_flow(&mut self, redirect_flow_id: impl Into<String>) {
        self.redirect_flow_id = redirect_flow_id.into();
    }

    /// Counts a successfully sent approval-request email.
    pub fn record_approval_request_sent(&mut self) {
        self.approval_request_count += 1;
    }
}
