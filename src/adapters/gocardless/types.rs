//! Wire types for the GoCardless REST API.
//!
//! Every request and response body is wrapped in a resource-named
//! envelope (`{"payments": {...}}`), and cross-resource references live
//! in a `links` object.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// Redirect flows
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct CreateRedirectFlowEnvelope {
    pub redirect_flows: CreateRedirectFlowBody,
}

#[derive(Debug, Serialize)]
pub struct CreateRedirectFlowBody {
    pub description: String,
    pub session_token: String,
    pub success_redirect_url: String,
    pub prefilled_customer: PrefilledCustomer,
}

#[derive(Debug, Serialize)]
pub struct PrefilledCustomer {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CompleteRedirectFlowEnvelope {
    pub data: CompleteRedirectFlowBody,
}

#[derive(Debug, Serialize)]
pub struct CompleteRedirectFlowBody {
    pub session_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RedirectFlowEnvelope {
    pub redirect_flows: RedirectFlowResource,
}

#[derive(Debug, Deserialize)]
pub struct RedirectFlowResource {
    pub id: String,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub links: RedirectFlowLinks,
}

#[derive(Debug, Default, Deserialize)]
pub struct RedirectFlowLinks {
    pub mandate: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Mandates
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct MandateEnvelope {
    pub mandates: MandateResource,
}

#[derive(Debug, Deserialize)]
pub struct MandateResource {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub links: MandateLinks,
}

#[derive(Debug, Default, Deserialize)]
pub struct MandateLinks {
    pub customer: Option<String>,
    pub creditor: Option<String>,
    pub customer_bank_account: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Payments
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct CreatePaymentEnvelope {
    pub payments: CreatePaymentBody,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentBody {
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub links: CreatePaymentLinks,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentLinks {
    pub mandate: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentEnvelope {
    pub payments: PaymentResource,
}

#[derive(Debug, Deserialize)]
pub struct PaymentResource {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub charge_date: Option<NaiveDate>,
    #[serde(default)]
    pub amount_refunded: i64,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub links: PaymentLinks,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentLinks {
    pub mandate: Option<String>,
    pub creditor: Option<String>,
    pub payout: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}
