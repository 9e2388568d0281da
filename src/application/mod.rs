//! Application layer: the workflow handlers that orchestrate domain
//! entities through the ports.

pub mod billing;
pub mod membership;
mod urls;

pub use urls::PublicUrls;
