//! End-to-end supporter journey against in-memory adapters and the
//! scriptable gateway: apply, set up a mandate, approve, collect, and
//! reconcile the paid-out webhook.

use std::sync::Arc;

use chrono::NaiveDate;

use spacefed_members::adapters::email::RecordingMailer;
use spacefed_members::adapters::gocardless::MockGateway;
use spacefed_members::adapters::memory::{
    InMemoryApplications, InMemoryMandates, InMemoryPayments, InMemoryUsers,
};
use spacefed_members::application::billing::{
    CancelMandateHandler, ChargeMandateHandler, ProcessMandateEventHandler,
    ProcessPaymentEventHandler, ProcessWebhookBatchHandler,
};
use spacefed_members::application::membership::{
    CompleteRedirectFlowCommand, CompleteRedirectFlowHandler, DecideApplicationCommand,
    DecideApplicationHandler, Decision, RequestApprovalHandler, StartRedirectFlowHandler,
    SubmitApplicationCommand, SubmitApplicationHandler,
};
use spacefed_members::application::PublicUrls;
use spacefed_members::domain::foundation::{Fee, UserId};
use spacefed_members::domain::membership::ApplicationStatus;
use spacefed_members::ports::{
    ApplicationRepository, EventLinks, MandateRepository, PaymentRepository, UserProfile,
    WebhookBatch, WebhookEvent,
};

struct World {
    applications: Arc<InMemoryApplications>,
    mandates: Arc<InMemoryMandates>,
    payments: Arc<InMemoryPayments>,
    users: Arc<InMemoryUsers>,
    gateway: Arc<MockGateway>,
    mailer: Arc<RecordingMailer>,
    urls: PublicUrls,
    user_id: UserId,
}

fn world() -> World {
    let users = Arc::new(InMemoryUsers::new());
    let user_id = UserId::new();
    users.put(UserProfile {
        user_id,
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.org".to_string(),
    });
    World {
        applications: Arc::new(InMemoryApplications::new()),
        mandates: Arc::new(InMemoryMandates::new()),
        payments: Arc::new(InMemoryPayments::new()),
        users,
        gateway: Arc::new(MockGateway::new()),
        mailer: Arc::new(RecordingMailer::new()),
        urls: PublicUrls::new("https://members.example.org"),
        user_id,
    }
}

impl World {
    fn decide_handler(&self) -> DecideApplicationHandler {
        DecideApplicationHandler::new(
            self.applications.clone(),
            self.mandates.clone(),
            self.users.clone(),
            self.mailer.clone(),
            ChargeMandateHandler::new(self.gateway.clone(), self.payments.clone()),
            CancelMandateHandler::new(self.gateway.clone(), self.mandates.clone()),
        )
    }

    fn webhook_handler(&self) -> ProcessWebhookBatchHandler {
        ProcessWebhookBatchHandler::new(
            ProcessPaymentEventHandler::new(
                self.gateway.clone(),
                self.payments.clone(),
                self.mandates.clone(),
                self.applications.clone(),
            ),
            ProcessMandateEventHandler::new(self.gateway.clone(), self.mandates.clone()),
        )
    }

    /// Runs apply -> redirect flow -> mandate, returning the stored
    /// application's session token.
    async fn set_up_mandate(&self) -> spacefed_members::domain::foundation::SessionToken {
        SubmitApplicationHandler::new(self.applications.clone())
            .handle(SubmitApplicationCommand {
                user_id: self.user_id,
                fee: Fee::parse("25.00").unwrap(),
                statement: "I teach the welding classes".to_string(),
            })
            .await
            .unwrap();

        let redirect_url = StartRedirectFlowHandler::new(
            self.applications.clone(),
            self.users.clone(),
            self.gateway.clone(),
            self.urls.clone(),
        )
        .handle(&self.user_id)
        .await
        .unwrap();
        assert!(redirect_url.starts_with("https://"));

        let application = self
            .applications
            .find_latest_by_user(&self.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(application.session_token.as_str().len(), 32);

        CompleteRedirectFlowHandler::new(
            self.applications.clone(),
            self.mandates.clone(),
            self.gateway.clone(),
        )
        .handle(CompleteRedirectFlowCommand {
            redirect_flow_id: application.redirect_flow_id.clone(),
            session_token: application.session_token.clone(),
        })
        .await
        .unwrap();

        // mandate ready, ask the approver
        let mut application = self
            .applications
            .find_by_session_token(&application.session_token)
            .await
            .unwrap()
            .unwrap();
        let sent = RequestApprovalHandler::new(
            self.applications.clone(),
            self.users.clone(),
            self.mailer.clone(),
            self.urls.clone(),
        )
        .handle(&mut application)
        .await
        .unwrap();
        assert!(sent);

        application.session_token
    }
}

fn paid_out_event(payment_id: &str) -> WebhookEvent {
    WebhookEvent {
        id: "EV-PAIDOUT".to_string(),
        resource_type: "payments".to_string(),
        action: "paid_out".to_string(),
        links: EventLinks {
            mandate: None,
            payment: Some(payment_id.to_string()),
        },
        details: serde_json::Value::Null,
    }
}

#[tokio::test]
async fn approved_supporter_is_charged_and_activated_by_the_payout_webhook() {
    let world = world();
    let token = world.set_up_mandate().await;

    // the approver's email carries the one-time links
    let emails = world.mailer.approval_requests();
    assert_eq!(emails.len(), 1);
    assert!(emails[0].approve_url.contains(token.as_str()));

    let outcome = world
        .decide_handler()
        .handle(DecideApplicationCommand {
            session_token: token.clone(),
            decision: Decision::Approve,
        })
        .await
        .unwrap();
    assert_eq!(outcome.application.status, ApplicationStatus::Approved);

    // exactly one charge, for the exact fee in pence
    let payment = outcome.payment.expect("approval should charge");
    let requests = world.gateway.created_payment_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount, 2500);
    assert_eq!(requests[0].currency, "GBP");

    // membership is not active until the money pays out
    let application = world
        .applications
        .find_by_session_token(&token)
        .await
        .unwrap()
        .unwrap();
    assert!(application.started_at.is_none());

    // gateway settles the payment, then notifies us
    let payout = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
    world
        .gateway
        .set_payment_status(payment.id.as_str(), "paid_out", Some(payout));
    let trace = world
        .webhook_handler()
        .handle(&WebhookBatch {
            events: vec![paid_out_event(payment.id.as_str())],
        })
        .await;
    assert!(trace.contains("payment updated"));

    let application = world
        .applications
        .find_by_session_token(&token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.started_at, Some(payout));
    assert_eq!(
        application.expired_at,
        Some(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
    );
    assert!(application.is_active(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()));
    assert!(!application.is_active(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()));

    let stored_payment = world
        .payments
        .find_by_id(&payment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_payment.payout_date, Some(payout));
}

#[tokio::test]
async fn rejected_supporter_keeps_no_active_mandate_and_is_never_charged() {
    let world = world();
    let token = world.set_up_mandate().await;

    let outcome = world
        .decide_handler()
        .handle(DecideApplicationCommand {
            session_token: token.clone(),
            decision: Decision::Reject,
        })
        .await
        .unwrap();
    assert_eq!(outcome.application.status, ApplicationStatus::Rejected);
    assert!(outcome.payment.is_none());
    assert!(world.gateway.created_payment_requests().is_empty());

    let application = world
        .applications
        .find_by_session_token(&token)
        .await
        .unwrap()
        .unwrap();
    let mandate = world
        .mandates
        .find_latest_for_application(&application.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!mandate.is_active());

    // both decision links cannot fire
    let second = world
        .decide_handler()
        .handle(DecideApplicationCommand {
            session_token: token,
            decision: Decision::Approve,
        })
        .await;
    assert!(second.is_err());
}

#[tokio::test]
async fn webhook_redelivery_after_approval_does_not_move_the_window() {
    let world = world();
    let token = world.set_up_mandate().await;

    let outcome = world
        .decide_handler()
        .handle(DecideApplicationCommand {
            session_token: token.clone(),
            decision: Decision::Approve,
        })
        .await
        .unwrap();
    let payment = outcome.payment.unwrap();

    let payout = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
    world
        .gateway
        .set_payment_status(payment.id.as_str(), "paid_out", Some(payout));

    let batch = WebhookBatch {
        events: vec![paid_out_event(payment.id.as_str())],
    };
    world.webhook_handler().handle(&batch).await;
    world.webhook_handler().handle(&batch).await;

    let application = world
        .applications
        .find_by_session_token(&token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.started_at, Some(payout));
    assert_eq!(
        application.expired_at,
        Some(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
    );
}
