//! GoCardless gateway adapter: the REST client, webhook signature
//! verification, and a scriptable in-process stand-in for tests.

mod client;
mod mock_gateway;
mod types;
mod webhook;

pub use client::GoCardlessClient;
pub use mock_gateway::MockGateway;
pub use webhook::{SignatureError, WebhookSignatureVerifier};
