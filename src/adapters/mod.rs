//! Adapters: concrete implementations of the ports.

pub mod email;
pub mod gocardless;
pub mod http;
pub mod memory;
pub mod postgres;
