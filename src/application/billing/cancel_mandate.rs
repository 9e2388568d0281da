//! CancelMandateHandler - best-effort mandate cancellation.

use std::sync::Arc;

use crate::domain::billing::Mandate;
use crate::ports::{MandateRepository, PaymentGateway};

/// Cancels a mandate at the gateway and mirrors the resulting status.
///
/// Cancellation is cleanup after a rejection, never a primary operation:
/// every failure is logged and swallowed so the rejection itself stands.
pub struct CancelMandateHandler {
    gateway: Arc<dyn PaymentGateway>,
    mandates: Arc<dyn MandateRepository>,
}

impl CancelMandateHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, mandates: Arc<dyn MandateRepository>) -> Self {
        Self { gateway, mandates }
    }

    /// Returns whether the mandate was cancelled and the new state stored.
    pub async fn handle(&self, mandate: &mut Mandate) -> bool {
        let detail = match self.gateway.cancel_mandate(&mandate.id).await {
            Ok(detail) => detail,
            Err(err) => {
                tracing::warn!(
                    mandate_id = %mandate.id,
                    error = %err,
                    "mandate cancellation failed at the gateway"
                );
                return false;
            }
        };

        mandate.apply_detail(&detail);

        if let Err(err) = self.mandates.upsert(mandate).await {
            tracing::error!(
                mandate_id = %mandate.id,
                error = %err,
                "cancelled at the gateway but failed to store the new status"
            );
            return false;
        }

        tracing::info!(mandate_id = %mandate.id, status = %mandate.status, "mandate cancelled");
        true
    }
}
