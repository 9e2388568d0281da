//! HTTP surface for the membership workflow.

mod dto;
mod handlers;
mod routes;

pub use handlers::AppState;
pub use routes::router;
