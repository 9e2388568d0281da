//! Payment gateway port for the external direct-debit processor.
//!
//! Defines the contract for GoCardless-style gateway integrations:
//! redirect-flow mandate setup, mandate lifecycle, and payment
//! creation/fetching.
//!
//! # Design
//!
//! - **No automatic retries**: retry policy belongs to the caller.
//!   Payment creation takes a caller-supplied idempotency key so a
//!   caller-level retry is safe to re-issue.
//! - **Two failure classes**: transport problems ([`GatewayError::Network`],
//!   which includes timeouts) versus processor-side refusals
//!   ([`GatewayError::Rejected`]). Call sites classify, never assume
//!   success.
//! - **Authoritative detail**: `get_mandate`/`get_payment` return the
//!   gateway's current truth; webhook handlers re-fetch through these
//!   instead of trusting event payloads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::billing::{MandateDetail, PaymentDetail};
use crate::domain::foundation::{MandateId, PaymentId, SessionToken};
use crate::domain::membership::MembershipError;

/// Port for the external payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Starts a gateway-hosted mandate authorization flow.
    ///
    /// Returns the URL to redirect the payer's browser to.
    async fn create_redirect_flow(
        &self,
        request: CreateRedirectFlowRequest,
    ) -> Result<RedirectFlow, GatewayError>;

    /// Completes a redirect flow after the payer returns.
    ///
    /// Fails with `Rejected` for an already-completed flow or a session
    /// token mismatch.
    async fn complete_redirect_flow(
        &self,
        flow_id: &str,
        session_token: &SessionToken,
    ) -> Result<CompletedRedirectFlow, GatewayError>;

    /// Fetches authoritative mandate detail.
    async fn get_mandate(&self, id: &MandateId) -> Result<MandateDetail, GatewayError>;

    /// Cancels a mandate, returning the resulting detail (normally with
    /// status `cancelled`).
    async fn cancel_mandate(&self, id: &MandateId) -> Result<MandateDetail, GatewayError>;

    /// Creates a payment against a mandate.
    ///
    /// The idempotency key is sent with the request so the gateway
    /// collapses retried creations into one logical payment.
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentDetail, GatewayError>;

    /// Fetches authoritative payment detail.
    async fn get_payment(&self, id: &PaymentId) -> Result<PaymentDetail, GatewayError>;
}

/// Payer details pre-filled into the gateway's authorization form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPrefill {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
}

/// Request to start a redirect flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRedirectFlowRequest {
    /// Human-readable description shown on the gateway's page.
    pub description: String,

    /// Token later required to complete the flow.
    pub session_token: SessionToken,

    /// Where the gateway sends the payer's browser afterwards.
    pub success_redirect_url: String,

    pub prefilled_customer: CustomerPrefill,
}

/// A created redirect flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectFlow {
    /// Gateway flow id, persisted for the completion call.
    pub id: String,

    /// Gateway-hosted URL for the payer's browser.
    pub redirect_url: String,
}

/// A completed redirect flow, carrying the mandate it created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedRedirectFlow {
    pub id: String,
    pub mandate_id: MandateId,
}

/// Request to create a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    /// Amount in minor currency units (pence).
    pub amount: i64,

    /// ISO currency code, e.g. `GBP`.
    pub currency: String,

    pub mandate_id: MandateId,

    pub description: Option<String>,

    /// Caller-supplied deduplication key, recorded on the local payment.
    pub idempotency_key: String,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Transport-level failure: connection refused, DNS, timeout. The
    /// request may or may not have reached the gateway.
    #[error("gateway request failed: {0}")]
    Network(String),

    /// The gateway understood the request and refused it.
    #[error("gateway rejected request: {message}")]
    Rejected {
        /// Gateway error code when one was supplied.
        code: Option<String>,
        message: String,
    },
}

impl GatewayError {
    /// Creates a transport failure.
    pub fn network(message: impl Into<String>) -> Self {
        GatewayError::Network(message.into())
    }

    /// Creates a processor-side rejection.
    pub fn rejected(code: Option<String>, message: impl Into<String>) -> Self {
        GatewayError::Rejected {
            code,
            message: message.into(),
        }
    }

    /// Whether the gateway itself refused the request (as opposed to a
    /// transport problem where the outcome is unknown).
    pub fn is_rejection(&self) -> bool {
        matches!(self, GatewayError::Rejected { .. })
    }
}

impl From<GatewayError> for MembershipError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Network(message) => MembershipError::GatewayUnavailable { message },
            GatewayError::Rejected { message, .. } => MembershipError::GatewayRejected { message },
        }
    }
}
