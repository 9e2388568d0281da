//! Foundation value objects shared across the domain.

mod errors;
mod fee;
mod ids;
mod session_token;
mod timestamp;

pub use errors::{StorageError, ValidationError};
pub use fee::Fee;
pub use ids::{ApplicationId, MandateId, PaymentId, UserId};
pub use session_token::SessionToken;
pub use timestamp::Timestamp;
