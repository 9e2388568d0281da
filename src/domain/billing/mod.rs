//! Billing domain: mandates and payments mirrored from the gateway.

mod mandate;
mod payment;

pub use mandate::{Mandate, MandateDetail, MandateStatus};
pub use payment::{Payment, PaymentDetail, PaymentStatus, PaymentTransition};
