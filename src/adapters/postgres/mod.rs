//! Postgres adapter implementations of the repository ports.

mod application_repository;
mod mandate_repository;
mod payment_repository;
mod user_directory;

pub use application_repository::PostgresApplications;
pub use mandate_repository::PostgresMandates;
pub use payment_repository::PostgresPayments;
pub use user_directory::PostgresUsers;
