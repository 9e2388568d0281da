//! Scriptable in-process gateway for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::billing::{MandateDetail, MandateStatus, PaymentDetail, PaymentStatus};
use crate::domain::foundation::{MandateId, PaymentId, SessionToken};
use crate::ports::{
    CompletedRedirectFlow, CreatePaymentRequest, CreateRedirectFlowRequest, GatewayError,
    PaymentGateway, RedirectFlow,
};

struct Flow {
    session_token: SessionToken,
    completed: bool,
}

#[derive(Default)]
struct State {
    mandates: HashMap<String, MandateDetail>,
    payments: HashMap<String, PaymentDetail>,
    flows: HashMap<String, Flow>,
    /// Idempotency key to payment id, for creation dedup.
    payment_keys: HashMap<String, String>,
    redirect_flow_requests: Vec<CreateRedirectFlowRequest>,
    payment_requests: Vec<CreatePaymentRequest>,
    /// Call index to injected failure.
    failures: HashMap<u64, GatewayError>,
    calls: u64,
    next_flow: u32,
    next_mandate: u32,
    next_payment: u32,
}

/// In-memory [`PaymentGateway`] with the observable behaviors the real
/// processor has: sequential ids, redirect flows that complete exactly
/// once, idempotency-key deduplication, and injectable failures.
#[derive(Default)]
pub struct MockGateway {
    state: Mutex<State>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds (or replaces) a mandate with the given status.
    pub fn put_mandate_status(&self, id: &str, status: &str) {
        let mut state = self.state.lock().unwrap();
        state.mandates.insert(
            id.to_string(),
            MandateDetail {
                id: MandateId::new(id).unwrap(),
                status: MandateStatus::new(status),
                reference: None,
                customer_id: None,
                creditor_id: None,
                customer_bank_account_id: None,
            },
        );
    }

    /// Seeds (or replaces) a full payment detail.
    pub fn put_payment_detail(&self, detail: PaymentDetail) {
        let mut state = self.state.lock().unwrap();
        state.payments.insert(detail.id.as_str().to_string(), detail);
    }

    /// Moves a seeded payment to a new status, as a webhook-side status
    /// change would.
    ///
    /// # Panics
    ///
    /// Panics if the payment was never seeded.
    pub fn set_payment_status(&self, id: &str, status: &str, payout_date: Option<NaiveDate>) {
        let mut state = self.state.lock().unwrap();
        let detail = state
            .payments
            .get_mut(id)
            .unwrap_or_else(|| panic!("payment {id} not seeded"));
        detail.status = PaymentStatus::new(status);
        detail.payout_date = payout_date;
    }

    /// Makes the next gateway call fail with `error`.
    pub fn fail_next(&self, error: GatewayError) {
        self.fail_nth(1, error);
    }

    /// Makes the `n`th gateway call from now fail with `error` (1-based).
    pub fn fail_nth(&self, n: u64, error: GatewayError) {
        let mut state = self.state.lock().unwrap();
        let at = state.calls + n;
        state.failures.insert(at, error);
    }

    /// All redirect-flow creation requests received, in order.
    pub fn created_redirect_flows(&self) -> Vec<CreateRedirectFlowRequest> {
        self.state.lock().unwrap().redirect_flow_requests.clone()
    }

    /// All payment creation requests received, in order (including ones
    /// collapsed by idempotency-key dedup).
    pub fn created_payment_requests(&self) -> Vec<CreatePaymentRequest> {
        self.state.lock().unwrap().payment_requests.clone()
    }

    /// Number of distinct payments that exist gateway-side.
    pub fn payment_count(&self) -> usize {
        self.state.lock().unwrap().payments.len()
    }

    fn check_failure(state: &mut State) -> Result<(), GatewayError> {
        state.calls += 1;
        match state.failures.remove(&state.calls) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_redirect_flow(
        &self,
        request: CreateRedirectFlowRequest,
    ) -> Result<RedirectFlow, GatewayError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&mut state)?;

        state.next_flow += 1;
        let id = format!("RE{:04}", state.next_flow);
        state.flows.insert(
            id.clone(),
            Flow {
                session_token: request.session_token.clone(),
                completed: false,
            },
        );
        state.redirect_flow_requests.push(request);

        Ok(RedirectFlow {
            redirect_url: format!("https://pay.sandbox.example.com/flow/{id}"),
            id,
        })
    }

    async fn complete_redirect_flow(
        &self,
        flow_id: &str,
        session_token: &SessionToken,
    ) -> Result<CompletedRedirectFlow, GatewayError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&mut state)?;

        let flow = state
            .flows
            .get_mut(flow_id)
            .ok_or_else(|| GatewayError::rejected(None, format!("flow {flow_id} not found")))?;
        if flow.completed {
            return Err(GatewayError::rejected(
                Some("invalid_state".to_string()),
                "flow already completed",
            ));
        }
        if flow.session_token != *session_token {
            return Err(GatewayError::rejected(None, "session token mismatch"));
        }
        flow.completed = true;

        state.next_mandate += 1;
        let serial = state.next_mandate;
        let mandate_id = MandateId::new(format!("MD{serial:04}"))
            .map_err(|err| GatewayError::network(err.to_string()))?;
        state.mandates.insert(
            mandate_id.as_str().to_string(),
            MandateDetail {
                id: mandate_id.clone(),
                status: MandateStatus::new("pending_submission"),
                reference: Some(format!("SPACEFED-{serial}")),
                customer_id: Some(format!("CU{serial:04}")),
                creditor_id: Some("CR0001".to_string()),
                customer_bank_account_id: Some(format!("BA{serial:04}")),
            },
        );

        Ok(CompletedRedirectFlow {
            id: flow_id.to_string(),
            mandate_id,
        })
    }

    async fn get_mandate(&self, id: &MandateId) -> Result<MandateDetail, GatewayError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&mut state)?;
        state
            .mandates
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::rejected(None, format!("mandate {id} not found")))
    }

    async fn cancel_mandate(&self, id: &MandateId) -> Result<MandateDetail, GatewayError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&mut state)?;
        let detail = state
            .mandates
            .get_mut(id.as_str())
            .ok_or_else(|| GatewayError::rejected(None, format!("mandate {id} not found")))?;
        detail.status = MandateStatus::new("cancelled");
        Ok(detail.clone())
    }

    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentDetail, GatewayError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&mut state)?;

        if let Some(existing) = state.payment_keys.get(&request.idempotency_key) {
            let detail = state.payments[existing].clone();
            state.payment_requests.push(request);
            return Ok(detail);
        }

        state.next_payment += 1;
        let id = PaymentId::new(format!("PM{:04}", state.next_payment))
            .map_err(|err| GatewayError::network(err.to_string()))?;
        let detail = PaymentDetail {
            id: id.clone(),
            status: PaymentStatus::new("pending_submission"),
            amount: request.amount,
            currency: request.currency.clone(),
            charge_date: None,
            payout_date: None,
            amount_refunded: 0,
            reference: None,
            description: request.description.clone(),
            creditor_id: Some("CR0001".to_string()),
            payout_id: None,
            mandate_id: Some(request.mandate_id.clone()),
        };
        state
            .payment_keys
            .insert(request.idempotency_key.clone(), id.as_str().to_string());
        state.payments.insert(id.as_str().to_string(), detail.clone());
        state.payment_requests.push(request);

        Ok(detail)
    }

    async fn get_payment(&self, id: &PaymentId) -> Result<PaymentDetail, GatewayError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&mut state)?;
        state
            .payments
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::rejected(None, format!("payment {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::CustomerPrefill;

    fn flow_request(token: &SessionToken) -> CreateRedirectFlowRequest {
        CreateRedirectFlowRequest {
            description: "test".to_string(),
            session_token: token.clone(),
            success_redirect_url: "https://example.org/done".to_string(),
            prefilled_customer: CustomerPrefill {
                given_name: "Ada".to_string(),
                family_name: "Lovelace".to_string(),
                email: "ada@example.org".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn flow_completes_exactly_once() {
        let gateway = MockGateway::new();
        let token = SessionToken::generate();
        let flow = gateway.create_redirect_flow(flow_request(&token)).await.unwrap();

        assert!(gateway.complete_redirect_flow(&flow.id, &token).await.is_ok());
        let err = gateway
            .complete_redirect_flow(&flow.id, &token)
            .await
            .unwrap_err();
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn completion_mints_a_fetchable_mandate() {
        let gateway = MockGateway::new();
        let token = SessionToken::generate();
        let flow = gateway.create_redirect_flow(flow_request(&token)).await.unwrap();
        let completed = gateway.complete_redirect_flow(&flow.id, &token).await.unwrap();

        let detail = gateway.get_mandate(&completed.mandate_id).await.unwrap();
        assert_eq!(detail.id, completed.mandate_id);
        assert_eq!(detail.reference.as_deref(), Some("SPACEFED-1"));
        assert_eq!(detail.customer_id.as_deref(), Some("CU0001"));
        assert_eq!(detail.customer_bank_account_id.as_deref(), Some("BA0001"));
    }

    #[tokio::test]
    async fn completion_requires_the_matching_token() {
        let gateway = MockGateway::new();
        let token = SessionToken::generate();
        let flow = gateway.create_redirect_flow(flow_request(&token)).await.unwrap();

        let err = gateway
            .complete_redirect_flow(&flow.id, &SessionToken::generate())
            .await
            .unwrap_err();
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn injected_failure_hits_exactly_one_call() {
        let gateway = MockGateway::new();
        gateway.put_mandate_status("MD0001", "active");
        gateway.fail_next(GatewayError::network("boom"));

        let id = MandateId::new("MD0001").unwrap();
        assert!(gateway.get_mandate(&id).await.is_err());
        assert!(gateway.get_mandate(&id).await.is_ok());
    }
}
