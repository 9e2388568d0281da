//! Single direct-debit charge entity.
//!
//! Like the mandate, a payment is keyed by the gateway's identifier and
//! its mutable fields are only ever overwritten from gateway-fetched
//! detail. The one piece of locally-derived state is `payout_date`,
//! stamped when the status transitions to `paid_out`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{MandateId, PaymentId, Timestamp};

/// Terminal status meaning the collected money reached the creditor.
const PAID_OUT: &str = "paid_out";

/// Payment status string mirrored verbatim from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentStatus(String);

impl PaymentStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the payment has settled to the creditor.
    pub fn is_paid_out(&self) -> bool {
        self.0 == PAID_OUT
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authoritative payment detail as fetched from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetail {
    pub id: PaymentId,
    pub status: PaymentStatus,
    /// Amount in minor currency units (pence).
    pub amount: i64,
    pub currency: String,
    pub charge_date: Option<NaiveDate>,
    /// Settlement date when the gateway exposes one; otherwise the
    /// paid-out transition is stamped with the processing date.
    pub payout_date: Option<NaiveDate>,
    pub amount_refunded: i64,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub creditor_id: Option<String>,
    pub payout_id: Option<String>,
    pub mandate_id: Option<MandateId>,
}

/// Outcome of applying gateway detail to a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentTransition {
    /// The status string changed value.
    pub status_changed: bool,
    /// The payment just entered `paid_out`; the caller must cascade to
    /// the owning mandate and application.
    pub became_paid_out: bool,
}

/// A single charge collected (or being collected) against a mandate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Gateway-assigned identifier, used as the primary key.
    pub id: PaymentId,

    /// When this record was first created locally.
    pub created_at: Timestamp,

    /// Date the gateway will (or did) collect from the payer's account.
    pub charge_date: NaiveDate,

    /// Date the collected money settled to the creditor; set on the
    /// paid-out transition.
    pub payout_date: Option<NaiveDate>,

    /// Amount in minor currency units (pence). Exact integer, never a
    /// float conversion.
    pub amount: i64,

    pub currency: String,

    /// Gateway status mirror.
    pub status: PaymentStatus,

    pub amount_refunded: i64,
    pub reference: String,
    pub description: String,

    /// Key sent with the creation call so gateway-side retries collapse
    /// into one logical payment. Recorded for audit.
    pub idempotency_key: String,

    pub creditor_id: String,
    pub payout_id: String,

    /// Owning mandate; `None` when a webhook references a payment whose
    /// mandate is unknown locally.
    pub mandate_id: Option<MandateId>,
}

impl Payment {
    /// Builds a payment from gateway detail.
    ///
    /// `today` stamps `payout_date` when the detail is already paid out
    /// but carries no settlement date.
    pub fn from_detail(
        detail: &PaymentDetail,
        mandate_id: Option<MandateId>,
        idempotency_key: Option<&str>,
        today: NaiveDate,
    ) -> Self {
        let payout_date = if detail.status.is_paid_out() {
            detail.payout_date.or(Some(today))
        } else {
            detail.payout_date
        };
        Self {
            id: detail.id.clone(),
            created_at: Timestamp::now(),
            charge_date: detail.charge_date.unwrap_or(today),
            payout_date,
            amount: detail.amount,
            currency: detail.currency.clone(),
            status: detail.status.clone(),
            amount_refunded: detail.amount_refunded,
            reference: detail.reference.clone().unwrap_or_default(),
            description: detail.description.clone().unwrap_or_default(),
            idempotency_key: idempotency_key.unwrap_or_default().to_string(),
            creditor_id: detail.creditor_id.clone().unwrap_or_default(),
            payout_id: detail.payout_id.clone().unwrap_or_default(),
            mandate_id: mandate_id.or_else(|| detail.mandate_id.clone()),
        }
    }

    /// Applies gateway detail field by field (last write wins).
    ///
    /// The mapping is exhaustive and auditable: status, amounts, dates,
    /// reference/description and link ids. On the transition into
    /// `paid_out`, `payout_date` is stamped from the detail or, failing
    /// that, with `today`.
    pub fn apply_detail(&mut self, detail: &PaymentDetail, today: NaiveDate) -> PaymentTransition {
        let was_paid_out = self.status.is_paid_out();
        let status_changed = self.status != detail.status;

        self.status = detail.status.clone();
        self.amount = detail.amount;
        self.currency = detail.currency.clone();
        self.amount_refunded = detail.amount_refunded;
        if let Some(charge_date) = detail.charge_date {
            self.charge_date = charge_date;
        }
        if let Some(reference) = &detail.reference {
            self.reference = reference.clone();
        }
        if let Some(description) = &detail.description {
            self.description = description.clone();
        }
        if let Some(creditor_id) = &detail.creditor_id {
            self.creditor_id = creditor_id.clone();
        }
        if let Some(payout_id) = &detail.payout_id {
            self.payout_id = payout_id.clone();
        }
        if detail.mandate_id.is_some() {
            self.mandate_id = detail.mandate_id.clone();
        }

        let became_paid_out = !was_paid_out && self.status.is_paid_out();
        if became_paid_out {
            self.payout_date = detail.payout_date.or(self.payout_date).or(Some(today));
        } else if let Some(payout_date) = detail.payout_date {
            self.payout_date = Some(payout_date);
        }

        PaymentTransition {
            status_changed,
            became_paid_out,
        }
    }
}
