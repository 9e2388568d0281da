//! Ports: the async trait seams between the application core and the
//! outside world (payment gateway, database, email, account system).

mod application_repository;
mod mailer;
mod mandate_repository;
mod payment_gateway;
mod payment_repository;
mod user_directory;
mod webhook;

pub use application_repository::ApplicationRepository;
pub use mailer::{ApprovalRequestEmail, DecisionEmail, EmailError, Mailer};
pub use mandate_repository::MandateRepository;
pub use payment_gateway::{
    CompletedRedirectFlow, CreatePaymentRequest, CreateRedirectFlowRequest, CustomerPrefill,
    GatewayError, PaymentGateway, RedirectFlow,
};
pub use payment_repository::PaymentRepository;
pub use user_directory::{UserDirectory, UserProfile};
pub use webhook::{EventLinks, WebhookBatch, WebhookEvent};
