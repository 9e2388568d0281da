//! Direct-debit mandate entity.
//!
//! A mandate is the payer's authorization for recurring charges, owned
//! and keyed by the payment gateway. Local state is only ever a mirror of
//! gateway-fetched detail — nothing here guesses a status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ApplicationId, MandateId, Timestamp};

/// Statuses that end a mandate's ability to collect payments.
///
/// Deliberately a deny-list: the gateway may introduce new status values
/// at any time and an unknown status must be treated as open, matching
/// gateway semantics where `active` is the default resting state.
const INACTIVE_STATUSES: [&str; 3] = ["failed", "expired", "cancelled"];

/// Mandate status string mirrored verbatim from the gateway.
///
/// Not an enum: unseen values must survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MandateStatus(String);

impl MandateStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// False iff the status is `failed`, `expired` or `cancelled`; every
    /// other value, including ones this code has never seen, is active.
    pub fn is_active(&self) -> bool {
        !INACTIVE_STATUSES.contains(&self.0.as_str())
    }
}

impl fmt::Display for MandateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authoritative mandate detail as fetched from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandateDetail {
    pub id: MandateId,
    pub status: MandateStatus,
    pub reference: Option<String>,
    pub customer_id: Option<String>,
    pub creditor_id: Option<String>,
    pub customer_bank_account_id: Option<String>,
}

/// A recurring-payment authorization linked (usually) to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mandate {
    /// Gateway-assigned identifier, used as the primary key.
    pub id: MandateId,

    /// When this record was first created locally.
    pub created_at: Timestamp,

    /// Gateway display reference shown on bank statements.
    pub reference: String,

    /// Gateway status mirror; see [`MandateStatus::is_active`].
    pub status: MandateStatus,

    pub creditor_id: String,
    pub customer_id: String,
    pub customer_bank_account_id: String,

    /// Owning application; `None` for mandates created outside the
    /// supporter flow (e.g. reconstructed from a webhook for an unknown
    /// mandate).
    pub application_id: Option<ApplicationId>,
}

impl Mandate {
    /// Builds a mandate from gateway detail.
    pub fn from_detail(detail: &MandateDetail, application_id: Option<ApplicationId>) -> Self {
        Self {
            id: detail.id.clone(),
            created_at: Timestamp::now(),
            reference: detail.reference.clone().unwrap_or_default(),
            status: detail.status.clone(),
            creditor_id: detail.creditor_id.clone().unwrap_or_default(),
            customer_id: detail.customer_id.clone().unwrap_or_default(),
            customer_bank_account_id: detail.customer_bank_account_id.clone().unwrap_or_default(),
            application_id,
        }
    }

    /// Whether one payment creation attempt is currently permitted.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Replaces the status, reporting whether the value actually changed.
    ///
    /// The explicit return value replaces save-time object diffing: the
    /// caller cascades to the owning application only on `true`.
    pub fn update_status(&mut self, new_status: MandateStatus) -> bool {
        if self.status == new_status {
            return false;
        }
        self.status = new_status;
        true
    }

    /// Applies gateway detail field by field.
    ///
    /// The mapping is exhaustive and auditable: status, reference and the
    /// three link ids. Returns whether the status changed, so the caller
    /// knows to notify the owning application.
    pub fn apply_detail(&mut self, detail: &MandateDetail) -> bool {
        if let Some(reference) = &detail.reference {
            self.reference = reference.clone();
        }
        if let Some(creditor_id) = &detail.creditor_id {
            self.creditor_id = creditor_id.clone();
        }
        if let Some(customer_id) = &detail.customer_id {
            self.customer_id = customer_id.clone();
        }
        if let Some(bank_account_id) = &detail.customer_bank_account_id {
            self.customer_bank_account_id = bank_account_id.clone();
        }
        self.update_status(detail.status.clone())
    }
}
