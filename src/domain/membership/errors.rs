//! Error type for membership workflows.

use thiserror::Error;

use crate::domain::foundation::{Fee, MandateId, StorageError, ValidationError};

use super::ApplicationStatus;

/// Errors surfaced by membership and billing operations.
#[derive(Debug, Clone, Error)]
pub enum MembershipError {
    /// No application matched the lookup. Deliberately carries no detail:
    /// approval-link handlers must not leak which tokens exist.
    #[error("membership application not found")]
    ApplicationNotFound,

    /// Approve/reject called on an application that is no longer pending.
    /// Guards the double-decision race; the caller treats this as a no-op
    /// failure.
    #[error("application already decided ({status})")]
    AlreadyDecided { status: ApplicationStatus },

    /// Attempt to charge a mandate whose status is failed/expired/cancelled.
    #[error("mandate {mandate_id} is not active")]
    InactiveMandate { mandate_id: MandateId },

    /// The applicant's account could not be found in the user directory.
    #[error("user account not found")]
    UserNotFound,

    /// Application form fee below the accepted minimum.
    #[error("fee {given} is below the minimum supporter fee of {minimum}")]
    FeeBelowMinimum { minimum: Fee, given: Fee },

    /// Transient failure reaching the payment gateway (network, timeout).
    #[error("payment gateway unavailable: {message}")]
    GatewayUnavailable { message: String },

    /// The gateway understood the request and refused it (e.g. completing
    /// an already-completed redirect flow).
    #[error("payment gateway rejected the request: {message}")]
    GatewayRejected { message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl MembershipError {
    /// Whether this error stems from the external gateway rather than
    /// local state.
    pub fn is_gateway_error(&self) -> bool {
        matches!(
            self,
            MembershipError::GatewayUnavailable { .. } | MembershipError::GatewayRejected { .. }
        )
    }
}
