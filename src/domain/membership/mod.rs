//! Supporter membership domain: the application aggregate and its
//! approval state machine.

mod application;
mod errors;
mod status;

pub use application::{MembershipApplication, MEMBERSHIP_TERM_DAYS};
pub use errors::MembershipError;
pub use status::ApplicationStatus;
