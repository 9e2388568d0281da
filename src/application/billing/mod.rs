//! Billing workflows: charging mandates and reconciling gateway webhooks.

mod cancel_mandate;
mod charge_mandate;
mod process_mandate_event;
mod process_payment_event;
mod process_webhook;

pub use cancel_mandate::CancelMandateHandler;
pub use charge_mandate::{billing_period_key, ChargeMandateHandler, CURRENCY};
pub use process_mandate_event::{MandateEventOutcome, ProcessMandateEventHandler};
pub use process_payment_event::{PaymentEventOutcome, ProcessPaymentEventHandler};
pub use process_webhook::ProcessWebhookBatchHandler;
