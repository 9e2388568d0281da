//! Webhook batch dispatcher.

use std::fmt::Write as _;

use crate::ports::WebhookBatch;

use super::{ProcessMandateEventHandler, ProcessPaymentEventHandler};

/// Dispatches a verified webhook batch to the per-resource handlers.
///
/// Batches are all-or-nothing only at the signature check: once inside,
/// each event is processed independently and a failure in one never
/// stops the rest. The returned trace (one line per event) goes back to
/// the gateway in the 200 response body.
pub struct ProcessWebhookBatchHandler {
    payments: ProcessPaymentEventHandler,
    mandates: ProcessMandateEventHandler,
}

impl ProcessWebhookBatchHandler {
    pub fn new(payments: ProcessPaymentEventHandler, mandates: ProcessMandateEventHandler) -> Self {
        Self { payments, mandates }
    }

    pub async fn handle(&self, batch: &WebhookBatch) -> String {
        let mut trace = String::new();
        for event in &batch.events {
            let line = match event.resource_type.as_str() {
                "payments" => match self.payments.handle(event).await {
                    Ok(outcome) => outcome.to_string(),
                    Err(err) => {
                        tracing::error!(event_id = %event.id, error = %err, "payment event failed");
                        format!("error: {err}")
                    }
                },
                "mandates" => match self.mandates.handle(event).await {
                    Ok(outcome) => outcome.to_string(),
                    Err(err) => {
                        tracing::error!(event_id = %event.id, error = %err, "mandate event failed");
                        format!("error: {err}")
                    }
                },
                other => {
                    tracing::debug!(event_id = %event.id, resource_type = other, "ignored event");
                    format!("ignored resource type {other}")
                }
            };
            // String formatting never fails
            let _ = writeln!(trace, "{}: {}", event.id, line);
        }
        trace
    }
}
