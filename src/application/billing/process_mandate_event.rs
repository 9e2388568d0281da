//! Mandate webhook event processing.

use std::fmt;
use std::sync::Arc;

use crate::domain::billing::Mandate;
use crate::domain::foundation::MandateId;
use crate::domain::membership::MembershipError;
use crate::ports::{MandateRepository, PaymentGateway, WebhookEvent};

/// What the pipeline did with one mandate event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandateEventOutcome {
    /// Known mandate, authoritative detail applied.
    Updated,
    /// Detail applied but nothing changed (duplicate delivery).
    Unchanged,
    /// Mandate was unknown locally and a row was rebuilt.
    Reconstructed,
    /// The re-fetch failed; the event was skipped, not failed.
    SkippedFetchFailed,
    /// The event named no mandate id.
    MissingMandateLink,
}

impl fmt::Display for MandateEventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MandateEventOutcome::Updated => write!(f, "mandate updated"),
            MandateEventOutcome::Unchanged => write!(f, "mandate unchanged"),
            MandateEventOutcome::Reconstructed => write!(f, "mandate reconstructed"),
            MandateEventOutcome::SkippedFetchFailed => write!(f, "skipped: gateway fetch failed"),
            MandateEventOutcome::MissingMandateLink => write!(f, "ignored: no mandate link"),
        }
    }
}

/// Processes `mandates` webhook events by re-fetching and mirroring
/// gateway detail. Status changes on mandates owned by an application
/// are surfaced in the logs for the operators watching membership
/// health.
pub struct ProcessMandateEventHandler {
    gateway: Arc<dyn PaymentGateway>,
    mandates: Arc<dyn MandateRepository>,
}

impl ProcessMandateEventHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, mandates: Arc<dyn MandateRepository>) -> Self {
        Self { gateway, mandates }
    }

    pub async fn handle(
        &self,
        event: &WebhookEvent,
    ) -> Result<MandateEventOutcome, MembershipError> {
        let Some(mandate_id) = &event.links.mandate else {
            tracing::warn!(event_id = %event.id, "mandate event without a mandate link");
            return Ok(MandateEventOutcome::MissingMandateLink);
        };
        let mandate_id = MandateId::new(mandate_id.clone())?;

        let detail = match self.gateway.get_mandate(&mandate_id).await {
            Ok(detail) => detail,
            Err(err) => {
                tracing::warn!(
                    event_id = %event.id,
                    mandate_id = %mandate_id,
                    error = %err,
                    "mandate re-fetch failed, skipping event"
                );
                return Ok(MandateEventOutcome::SkippedFetchFailed);
            }
        };

        match self.mandates.find_by_id(&mandate_id).await? {
            Some(mut mandate) => {
                let status_changed = mandate.apply_detail(&detail);
                self.mandates.upsert(&mandate).await?;
                if status_changed {
                    self.notify_status_change(&mandate, &event.action);
                    Ok(MandateEventOutcome::Updated)
                } else {
                    Ok(MandateEventOutcome::Unchanged)
                }
            }
            None => {
                tracing::warn!(
                    mandate_id = %mandate_id,
                    "webhook for a mandate not known locally, reconstructing"
                );
                let mandate = Mandate::from_detail(&detail, None);
                self.mandates.upsert(&mandate).await?;
                Ok(MandateEventOutcome::Reconstructed)
            }
        }
    }

    fn notify_status_change(&self, mandate: &Mandate, action: &str) {
        match &mandate.application_id {
            Some(application_id) => tracing::info!(
                mandate_id = %mandate.id,
                application_id = %application_id,
                status = %mandate.status,
                action,
                "mandate status changed"
            ),
            None => tracing::info!(
                mandate_id = %mandate.id,
                status = %mandate.status,
                action,
                "unowned mandate status changed"
            ),
        }
    }
}
