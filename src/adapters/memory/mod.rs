//! In-memory adapter implementations.
//!
//! Back the handler unit tests and the end-to-end scenario tests; also
//! useful for local experimentation without a database. Each store is a
//! mutex-guarded `Vec` in insertion order, so "latest" lookups are
//! simply the last matching element.

mod applications;
mod mandates;
mod payments;
mod users;

pub use applications::InMemoryApplications;
pub use mandates::InMemoryMandates;
pub use payments::InMemoryPayments;
pub use users::InMemoryUsers;
