//! Payment webhook event processing and the paid-out cascade.

use std::sync::Arc;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::billing::Payment;
use crate::domain::foundation::{PaymentId, Timestamp};
use crate::domain::membership::MembershipError;
use crate::ports::{
    ApplicationRepository, MandateRepository, PaymentGateway, PaymentRepository, WebhookEvent,
};

/// What the pipeline did with one payment event. Rendered into the
/// plaintext batch trace returned to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEventOutcome {
    /// Known payment, authoritative detail applied.
    Updated,
    /// Payment was unknown locally and a row was rebuilt from gateway
    /// detail.
    Reconstructed,
    /// The re-fetch failed; the event was skipped, not failed.
    SkippedFetchFailed,
    /// The event named no payment id.
    MissingPaymentLink,
}

impl fmt::Display for PaymentEventOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentEventOutcome::Updated => write!(f, "payment updated"),
            PaymentEventOutcome::Reconstructed => write!(f, "payment reconstructed"),
            PaymentEventOutcome::SkippedFetchFailed => write!(f, "skipped: gateway fetch failed"),
            PaymentEventOutcome::MissingPaymentLink => write!(f, "ignored: no payment link"),
        }
    }
}

/// Processes `payments` webhook events.
///
/// The event payload is only a hint: the handler re-fetches the payment
/// from the gateway and applies that authoritative detail. A transition
/// into `paid_out` cascades to the owning mandate's application, stamping
/// its membership window.
pub struct ProcessPaymentEventHandler {
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentRepository>,
    mandates: Arc<dyn MandateRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl ProcessPaymentEventHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        payments: Arc<dyn PaymentRepository>,
        mandates: Arc<dyn MandateRepository>,
        applications: Arc<dyn ApplicationRepository>,
    ) -> Self {
        Self {
            gateway,
            payments,
            mandates,
            applications,
        }
    }

    pub async fn handle(
        &self,
        event: &WebhookEvent,
    ) -> Result<PaymentEventOutcome, MembershipError> {
        let Some(payment_id) = &event.links.payment else {
            tracing::warn!(event_id = %event.id, "payment event without a payment link");
            return Ok(PaymentEventOutcome::MissingPaymentLink);
        };
        let payment_id = PaymentId::new(payment_id.clone())?;

        let detail = match self.gateway.get_payment(&payment_id).await {
            Ok(detail) => detail,
            Err(err) => {
                tracing::warn!(
                    event_id = %event.id,
                    payment_id = %payment_id,
                    error = %err,
                    "payment re-fetch failed, skipping event"
                );
                return Ok(PaymentEventOutcome::SkippedFetchFailed);
            }
        };

        let today = Timestamp::now().date();

        match self.payments.find_by_id(&payment_id).await? {
            Some(mut payment) => {
                let transition = payment.apply_detail(&detail, today);
                self.payments.upsert(&payment).await?;
                tracing::info!(
                    payment_id = %payment.id,
                    status = %payment.status,
                    action = %event.action,
                    "payment event applied"
                );
                if transition.became_paid_out {
                    self.cascade_paid_out(&payment, today).await;
                }
                Ok(PaymentEventOutcome::Updated)
            }
            None => {
                // Payment created outside this service (or lost). Rebuild a
                // row from gateway truth so the history is complete.
                let mandate_id = match &detail.mandate_id {
                    Some(id) => self.mandates.find_by_id(id).await?.map(|m| m.id),
                    None => None,
                };
                if mandate_id.is_none() {
                    tracing::warn!(
                        payment_id = %payment_id,
                        "reconstructing payment with no locally known mandate"
                    );
                }
                let payment = Payment::from_detail(&detail, mandate_id, None, today);
                self.payments.upsert(&payment).await?;
                if payment.status.is_paid_out() {
                    self.cascade_paid_out(&payment, today).await;
                }
                Ok(PaymentEventOutcome::Reconstructed)
            }
        }
    }

    /// Stamps the owning application's membership window from a paid-out
    /// payment.
    ///
    /// Every failure in here is logged and absorbed: the payment row is
    /// already stored and a later webhook redelivery or manual re-sync
    /// can repair the application.
    async fn cascade_paid_out(&self, payment: &Payment, today: NaiveDate) {
        let Some(mandate_id) = &payment.mandate_id else {
            tracing::warn!(payment_id = %payment.id, "paid out but no mandate to cascade to");
            return;
        };

        let mandate = match self.mandates.find_by_id(mandate_id).await {
            Ok(Some(mandate)) => mandate,
            Ok(None) => {
                tracing::warn!(
                    payment_id = %payment.id,
                    mandate_id = %mandate_id,
                    "paid out against a mandate not known locally"
                );
                return;
            }
            Err(err) => {
                tracing::error!(mandate_id = %mandate_id, error = %err, "mandate lookup failed");
                return;
            }
        };

        let Some(application_id) = &mandate.application_id else {
            tracing::warn!(
                mandate_id = %mandate.id,
                "paid out on a mandate with no owning application"
            );
            return;
        };

        let mut application = match self.applications.find_by_id(application_id).await {
            Ok(Some(application)) => application,
            Ok(None) => {
                tracing::error!(
                    application_id = %application_id,
                    mandate_id = %mandate.id,
                    "mandate points at a missing application"
                );
                return;
            }
            Err(err) => {
                tracing::error!(
                    application_id = %application_id,
                    error = %err,
                    "application lookup failed"
                );
                return;
            }
        };

        let payout_date = payment.payout_date.unwrap_or(today);
        application.record_payment_received(payout_date);

        match self.applications.update(&application).await {
            Ok(()) => tracing::info!(
                application_id = %application.id,
                started_at = %payout_date,
                expired_at = ?application.expired_at,
                "membership window stamped from paid-out payment"
            ),
            Err(err) => tracing::error!(
                application_id = %application.id,
                error = %err,
                "failed to store the membership window"
            ),
        }
    }
}
