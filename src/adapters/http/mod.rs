//! HTTP adapters.

pub mod membership;
