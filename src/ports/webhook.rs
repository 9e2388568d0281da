//! Wire format of the gateway's webhook event batches.
//!
//! Events are notifications to re-sync, not sources of field data: the
//! only parts the pipeline reads are the ids and the resource type. The
//! `details` object is retained for logging but never applied to local
//! state.

use serde::{Deserialize, Serialize};

/// A signed batch of events as POSTed by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookBatch {
    pub events: Vec<WebhookEvent>,
}

/// One asynchronous resource-change notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: String,

    /// Resource family, e.g. `payments` or `mandates`. Unknown values
    /// are skipped, not errors: the gateway adds resource types over
    /// time.
    pub resource_type: String,

    /// Gateway action name, e.g. `paid_out`, `cancelled`. Logged only.
    pub action: String,

    #[serde(default)]
    pub links: EventLinks,

    /// Gateway-supplied cause/description blob; observability only.
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Resource ids referenced by an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLinks {
    pub mandate: Option<String>,
    pub payment: Option<String>,
}
