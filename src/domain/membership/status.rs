//! Application approval status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Approval status of a membership application.
///
/// The only legal transitions are `Pending -> Approved` and
/// `Pending -> Rejected`. Both outcomes are terminal; an application is
/// never re-opened, and rejected applications are retained for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    /// Awaiting an approver's decision.
    Pending,
    /// Accepted; billing may begin.
    Approved,
    /// Declined; terminal but retained.
    Rejected,
}

impl ApplicationStatus {
    /// Whether a decision can still be made.
    pub fn is_pending(&self) -> bool {
        matches!(self, ApplicationStatus::Pending)
    }

    /// Canonical storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status '{}'", other)),
        }
    }
}
