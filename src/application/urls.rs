//! Builder for externally-reachable URLs embedded in redirects and
//! emails.

use crate::domain::foundation::SessionToken;

/// Public base URL of this service, used wherever a URL leaves the
/// process: the gateway's success redirect and the approver's links.
#[derive(Debug, Clone)]
pub struct PublicUrls {
    base: String,
}

impl PublicUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    /// Where the gateway sends the payer's browser after authorization.
    pub fn redirect_flow_success(&self) -> String {
        format!("{}/api/membership/redirect-flow/complete", self.base)
    }

    /// One-time approval link for the approver's email.
    pub fn approve(&self, token: &SessionToken) -> String {
        format!("{}/supporter-approval/{}/approve", self.base, token)
    }

    /// One-time rejection link for the approver's email.
    pub fn reject(&self, token: &SessionToken) -> String {
        format!("{}/supporter-approval/{}/reject", self.base, token)
    }
}
