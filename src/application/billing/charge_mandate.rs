//! ChargeMandateHandler - creates a payment against an active mandate.

use std::sync::Arc;

use crate::domain::billing::{Mandate, Payment};
use crate::domain::foundation::Timestamp;
use crate::domain::membership::{MembershipApplication, MembershipError};
use crate::ports::{CreatePaymentRequest, PaymentGateway, PaymentRepository};

/// All supporter fees are collected in sterling.
pub const CURRENCY: &str = "GBP";

/// Description attached to every supporter payment at the gateway.
const PAYMENT_DESCRIPTION: &str = "SpaceFed supporter membership";

/// Handler that requests a charge for a membership's current billing
/// period.
///
/// Preconditions are hard: an inactive mandate is a
/// [`MembershipError::InactiveMandate`] failure, never silently skipped.
pub struct ChargeMandateHandler {
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentRepository>,
}

impl ChargeMandateHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, payments: Arc<dyn PaymentRepository>) -> Self {
        Self { gateway, payments }
    }

    /// Creates one payment for the application's fee against the mandate
    /// and persists the gateway's view of it.
    pub async fn handle(
        &self,
        mandate: &Mandate,
        application: &MembershipApplication,
    ) -> Result<Payment, MembershipError> {
        if !mandate.is_active() {
            return Err(MembershipError::InactiveMandate {
                mandate_id: mandate.id.clone(),
            });
        }

        let idempotency_key = billing_period_key(application);

        let detail = self
            .gateway
            .create_payment(CreatePaymentRequest {
                amount: application.fee.pence(),
                currency: CURRENCY.to_string(),
                mandate_id: mandate.id.clone(),
                description: Some(PAYMENT_DESCRIPTION.to_string()),
                idempotency_key: idempotency_key.clone(),
            })
            .await?;

        let payment = Payment::from_detail(
            &detail,
            Some(mandate.id.clone()),
            Some(&idempotency_key),
            Timestamp::now().date(),
        );
        self.payments.upsert(&payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            mandate_id = %mandate.id,
            amount_pence = payment.amount,
            "payment requested"
        );

        Ok(payment)
    }
}

/// Deterministic idempotency key for one logical charge.
///
/// Derived from the application id and the billing period rather than
/// minted fresh per call: a retry after a timeout (where the original
/// request may have succeeded gateway-side) re-sends the same key and
/// the gateway deduplicates it. The period component is the current
/// expiry date, so the renewal charge for the next year gets a new key.
pub fn billing_period_key(application: &MembershipApplication) -> String {
    match application.expired_at {
        Some(expired_at) => format!("membership-{}-{}", application.id, expired_at),
        None => format!("membership-{}-initial", application.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gocardless::MockGateway;
    use crate::adapters::memory::InMemoryPayments;
    use crate::domain::billing::{MandateDetail, MandateStatus};
    use crate::domain::foundation::{Fee, MandateId, UserId};
    use chrono::NaiveDate;

    fn application(fee: &str) -> MembershipApplication {
        MembershipApplication::new(UserId::new(), Fee::parse(fee).unwrap(), "statement")
    }

    fn mandate(status: &str) -> Mandate {
        Mandate::from_detail(
            &MandateDetail {
                id: MandateId::new("MD0001TEST").unwrap(),
                status: MandateStatus::new(status),
                reference: None,
                customer_id: None,
                creditor_id: None,
                customer_bank_account_id: None,
            },
            None,
        )
    }

    #[tokio::test]
    async fn refuses_to_charge_an_inactive_mandate() {
        let gateway = Arc::new(MockGateway::new());
        let payments = Arc::new(InMemoryPayments::new());
        let handler = ChargeMandateHandler::new(gateway.clone(), payments);

        let err = handler
            .handle(&mandate("cancelled"), &application("25.00"))
            .await
            .unwrap_err();

        assert!(matches!(err, MembershipError::InactiveMandate { .. }));
        assert!(gateway.created_payment_requests().is_empty());
    }

    #[tokio::test]
    async fn charges_the_exact_fee_in_pence() {
        let gateway = Arc::new(MockGateway::new());
        gateway.put_mandate_status("MD0001TEST", "active");
        let payments = Arc::new(InMemoryPayments::new());
        let handler = ChargeMandateHandler::new(gateway.clone(), payments.clone());

        let payment = handler
            .handle(&mandate("active"), &application("25.00"))
            .await
            .unwrap();

        let requests = gateway.created_payment_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].amount, 2500);
        assert_eq!(requests[0].currency, "GBP");
        assert_eq!(requests[0].mandate_id.as_str(), "MD0001TEST");

        let stored = payments.find_by_id(&payment.id).await.unwrap().unwrap();
        assert_eq!(stored.amount, 2500);
        assert_eq!(stored.idempotency_key, requests[0].idempotency_key);
    }

    #[tokio::test]
    async fn idempotency_key_is_stable_for_the_same_billing_period() {
        let app = application("10.25");
        assert_eq!(billing_period_key(&app), billing_period_key(&app));
        assert_eq!(
            billing_period_key(&app),
            format!("membership-{}-initial", app.id)
        );
    }

    #[tokio::test]
    async fn idempotency_key_changes_with_the_billing_period() {
        let mut app = application("10.25");
        let initial = billing_period_key(&app);

        app.record_payment_received(NaiveDate::from_ymd_opt(2023, 1, 10).unwrap());
        let renewal = billing_period_key(&app);

        assert_ne!(initial, renewal);
        assert!(renewal.ends_with("2024-01-10"));
    }

    #[tokio::test]
    async fn retried_charge_with_the_same_key_creates_one_gateway_payment() {
        let gateway = Arc::new(MockGateway::new());
        let payments = Arc::new(InMemoryPayments::new());
        let handler = ChargeMandateHandler::new(gateway.clone(), payments);
        let app = application("25.00");
        let mandate = mandate("active");

        let first = handler.handle(&mandate, &app).await.unwrap();
        let second = handler.handle(&mandate, &app).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(gateway.payment_count(), 1);
    }

    #[tokio::test]
    async fn gateway_failure_propagates_and_persists_nothing() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_next(crate::ports::GatewayError::network("connect timeout"));
        let payments = Arc::new(InMemoryPayments::new());
        let handler = ChargeMandateHandler::new(gateway, payments.clone());

        let err = handler
            .handle(&mandate("active"), &application("25.00"))
            .await
            .unwrap_err();

        assert!(matches!(err, MembershipError::GatewayUnavailable { .. }));
        assert!(payments.is_empty());
    }
}
