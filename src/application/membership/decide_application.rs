//! DecideApplicationHandler - approves or rejects via a one-time link.

use std::str::FromStr;
use std::sync::Arc;

use crate::application::billing::{CancelMandateHandler, ChargeMandateHandler};
use crate::domain::billing::{Mandate, Payment};
use crate::domain::foundation::SessionToken;
use crate::domain::membership::{MembershipApplication, MembershipError};
use crate::ports::{ApplicationRepository, DecisionEmail, Mailer, MandateRepository, UserDirectory};

/// The approver's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl FromStr for Decision {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Decision::Approve),
            "reject" => Ok(Decision::Reject),
            _ => Err(()),
        }
    }
}

/// Command parsed from the approval link path.
#[derive(Debug, Clone)]
pub struct DecideApplicationCommand {
    pub session_token: SessionToken,
    pub decision: Decision,
}

/// What the decision produced.
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub application: MembershipApplication,
    /// The first charge, when approval triggered one successfully.
    pub payment: Option<Payment>,
}

/// Applies the approver's decision and runs its billing consequence.
///
/// The ordering invariant: the decided status is persisted BEFORE any
/// side effect (email, charge, cancellation). A side-effect failure can
/// never roll a decision back, so the audit record always reflects what
/// the approver chose.
pub struct DecideApplicationHandler {
    applications: Arc<dyn ApplicationRepository>,
    mandates: Arc<dyn MandateRepository>,
    users: Arc<dyn UserDirectory>,
    mailer: Arc<dyn Mailer>,
    charge: ChargeMandateHandler,
    cancel: CancelMandateHandler,
}

impl DecideApplicationHandler {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        mandates: Arc<dyn MandateRepository>,
        users: Arc<dyn UserDirectory>,
        mailer: Arc<dyn Mailer>,
        charge: ChargeMandateHandler,
        cancel: CancelMandateHandler,
    ) -> Self {
        Self {
            applications,
            mandates,
            users,
            mailer,
            charge,
            cancel,
        }
    }

    /// # Errors
    ///
    /// `ApplicationNotFound` for a stale token, `AlreadyDecided` when a
    /// second verdict races the first, `InactiveMandate` when approval
    /// finds a mandate that can no longer collect. In the last case the
    /// approval itself has already been stored.
    pub async fn handle(
        &self,
        command: DecideApplicationCommand,
    ) -> Result<DecisionOutcome, MembershipError> {
        let mut application = self
            .applications
            .find_by_session_token(&command.session_token)
            .await?
            .ok_or(MembershipError::ApplicationNotFound)?;

        match command.decision {
            Decision::Approve => application.approve()?,
            Decision::Reject => application.reject()?,
        }
        self.applications.update(&application).await?;

        tracing::info!(
            application_id = %application.id,
            status = %application.status,
            "application decided"
        );

        self.send_decision_email(&application).await;

        let payment = match command.decision {
            Decision::Approve => self.charge_for(&application).await?,
            Decision::Reject => {
                self.cancel_for(&application).await;
                None
            }
        };

        Ok(DecisionOutcome {
            application,
            payment,
        })
    }

    /// Decision notification to the applicant. Best-effort.
    async fn send_decision_email(&self, application: &MembershipApplication) {
        let applicant = match self.users.get(&application.user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::error!(
                    application_id = %application.id,
                    "decided application has no user profile, skipping email"
                );
                return;
            }
            Err(err) => {
                tracing::error!(
                    application_id = %application.id,
                    error = %err,
                    "user lookup failed, skipping decision email"
                );
                return;
            }
        };

        let email = DecisionEmail {
            applicant,
            fee: application.fee,
            status: application.status,
        };
        if let Err(err) = self.mailer.send_decision(&email).await {
            tracing::error!(
                application_id = %application.id,
                error = %err,
                "decision email failed"
            );
        }
    }

    /// First charge after approval.
    ///
    /// An inactive mandate is an error (the approver should know the
    /// membership cannot be billed), but a gateway outage is not: the
    /// approval stands and the charge is retried out of band.
    async fn charge_for(
        &self,
        application: &MembershipApplication,
    ) -> Result<Option<Payment>, MembershipError> {
        let mandate = self
            .mandates
            .find_latest_for_application(&application.id)
            .await?;

        let Some(mandate) = mandate else {
            tracing::warn!(
                application_id = %application.id,
                "approved with no mandate on file, nothing to charge"
            );
            return Ok(None);
        };

        if !mandate.is_active() {
            return Err(MembershipError::InactiveMandate {
                mandate_id: mandate.id,
            });
        }

        match self.charge.handle(&mandate, application).await {
            Ok(payment) => Ok(Some(payment)),
            Err(err) if err.is_gateway_error() => {
                tracing::error!(
                    application_id = %application.id,
                    error = %err,
                    "first charge failed at the gateway, approval stands"
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Cleanup after rejection: cancel the (now unused) mandate.
    async fn cancel_for(&self, application: &MembershipApplication) {
        let mandate = match self.mandates.find_latest_for_application(&application.id).await {
            Ok(mandate) => mandate,
            Err(err) => {
                tracing::error!(
                    application_id = %application.id,
                    error = %err,
                    "mandate lookup failed during rejection cleanup"
                );
                return;
            }
        };

        if let Some(mut mandate) = mandate.filter(Mandate::is_active) {
            if !self.cancel.handle(&mut mandate).await {
                tracing::warn!(
                    application_id = %application.id,
                    mandate_id = %mandate.id,
                    "mandate left uncancelled after rejection"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::email::RecordingMailer;
    use crate::adapters::gocardless::MockGateway;
    use crate::adapters::memory::{InMemoryApplications, InMemoryMandates, InMemoryPayments, InMemoryUsers};
    use crate::domain::billing::{MandateDetail, MandateStatus};
    use crate::domain::foundation::{Fee, MandateId, UserId};
    use crate::domain::membership::ApplicationStatus;
    use crate::ports::{GatewayError, PaymentGateway, PaymentRepository, UserProfile};

    struct Fixture {
        applications: Arc<InMemoryApplications>,
        mandates: Arc<InMemoryMandates>,
        payments: Arc<InMemoryPayments>,
        gateway: Arc<MockGateway>,
        mailer: Arc<RecordingMailer>,
        handler: DecideApplicationHandler,
        application: MembershipApplication,
    }

    async fn fixture(mandate_status: Option<&str>) -> Fixture {
        let applications = Arc::new(InMemoryApplications::new());
        let mandates = Arc::new(InMemoryMandates::new());
        let payments = Arc::new(InMemoryPayments::new());
        let users = Arc::new(InMemoryUsers::new());
        let gateway = Arc::new(MockGateway::new());
        let mailer = Arc::new(RecordingMailer::new());

        let user_id = UserId::new();
        users.put(UserProfile {
            user_id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.org".to_string(),
        });
        let application =
            MembershipApplication::new(user_id, Fee::parse("25.00").unwrap(), "statement");
        applications.save(&application).await.unwrap();

        if let Some(status) = mandate_status {
            gateway.put_mandate_status("MD0001TEST", status);
            mandates
                .upsert(&Mandate::from_detail(
                    &MandateDetail {
                        id: MandateId::new("MD0001TEST").unwrap(),
                        status: MandateStatus::new(status),
                        reference: None,
                        customer_id: None,
                        creditor_id: None,
                        customer_bank_account_id: None,
                    },
                    Some(application.id),
                ))
                .await
                .unwrap();
        }

        let handler = DecideApplicationHandler::new(
            applications.clone(),
            mandates.clone(),
            users,
            mailer.clone(),
            ChargeMandateHandler::new(gateway.clone(), payments.clone()),
            CancelMandateHandler::new(gateway.clone(), mandates.clone()),
        );
        Fixture {
            applications,
            mandates,
            payments,
            gateway,
            mailer,
            handler,
            application,
        }
    }

    fn command(fx: &Fixture, decision: Decision) -> DecideApplicationCommand {
        DecideApplicationCommand {
            session_token: fx.application.session_token.clone(),
            decision,
        }
    }

    #[tokio::test]
    async fn approval_charges_the_mandate_and_emails_the_applicant() {
        let fx = fixture(Some("active")).await;

        let outcome = fx.handler.handle(command(&fx, Decision::Approve)).await.unwrap();
        assert_eq!(outcome.application.status, ApplicationStatus::Approved);

        let payment = outcome.payment.unwrap();
        assert_eq!(payment.amount, 2500);
        assert!(fx
            .payments
            .find_by_id(&payment.id)
            .await
            .unwrap()
            .is_some());

        let decisions = fx.mailer.decisions();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].status, ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn rejection_cancels_the_mandate_and_creates_no_payment() {
        let fx = fixture(Some("active")).await;

        let outcome = fx.handler.handle(command(&fx, Decision::Reject)).await.unwrap();
        assert_eq!(outcome.application.status, ApplicationStatus::Rejected);
        assert!(outcome.payment.is_none());
        assert!(fx.gateway.created_payment_requests().is_empty());

        let mandate = fx
            .mandates
            .find_by_id(&MandateId::new("MD0001TEST").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(!mandate.is_active());
    }

    #[tokio::test]
    async fn second_decision_fails_and_the_first_stands() {
        let fx = fixture(Some("active")).await;

        fx.handler.handle(command(&fx, Decision::Approve)).await.unwrap();
        let err = fx
            .handler
            .handle(command(&fx, Decision::Reject))
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::AlreadyDecided { .. }));

        let stored = fx
            .applications
            .find_by_id(&fx.application.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ApplicationStatus::Approved);
        // only the first decision emailed
        assert_eq!(fx.mailer.decisions().len(), 1);
    }

    #[tokio::test]
    async fn approval_with_an_inactive_mandate_persists_then_errors() {
        let fx = fixture(Some("cancelled")).await;

        let err = fx
            .handler
            .handle(command(&fx, Decision::Approve))
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::InactiveMandate { .. }));

        // decision stored before the billing step ran
        let stored = fx
            .applications
            .find_by_id(&fx.application.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn approval_without_a_mandate_stands_with_no_charge() {
        let fx = fixture(None).await;

        let outcome = fx.handler.handle(command(&fx, Decision::Approve)).await.unwrap();
        assert_eq!(outcome.application.status, ApplicationStatus::Approved);
        assert!(outcome.payment.is_none());
    }

    #[tokio::test]
    async fn gateway_outage_during_the_first_charge_keeps_the_approval() {
        let fx = fixture(Some("active")).await;
        fx.gateway.fail_next(GatewayError::network("timed out"));

        let outcome = fx.handler.handle(command(&fx, Decision::Approve)).await.unwrap();
        assert_eq!(outcome.application.status, ApplicationStatus::Approved);
        assert!(outcome.payment.is_none());
    }

    #[tokio::test]
    async fn email_failure_never_rolls_back_the_decision() {
        let fx = fixture(Some("active")).await;
        fx.mailer.fail_next();

        let outcome = fx.handler.handle(command(&fx, Decision::Approve)).await.unwrap();
        assert_eq!(outcome.application.status, ApplicationStatus::Approved);
        assert!(outcome.payment.is_some());
    }

    #[tokio::test]
    async fn stale_token_is_not_found() {
        let fx = fixture(None).await;
        let err = fx
            .handler
            .handle(DecideApplicationCommand {
                session_token: SessionToken::generate(),
                decision: Decision::Approve,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::ApplicationNotFound));
    }

    #[tokio::test]
    async fn gateway_is_reachable_from_the_fixture() {
        // guards the fixture wiring itself: the mock serves the seeded mandate
        let fx = fixture(Some("active")).await;
        let detail = fx
            .gateway
            .get_mandate(&MandateId::new("MD0001TEST").unwrap())
            .await
            .unwrap();
        assert!(detail.status.is_active());
    }
}
