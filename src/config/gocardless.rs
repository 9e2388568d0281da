//! Payment gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment gateway configuration (GoCardless)
#[derive(Debug, Clone, Deserialize)]
pub struct GoCardlessConfig {
    /// GoCardless access token
    pub access_token: SecretString,

    /// Which gateway environment to talk to
    #[serde(default)]
    pub environment: GoCardlessEnvironment,

    /// Shared secret for webhook signature verification
    pub webhook_secret: SecretString,
}

/// Gateway environment
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoCardlessEnvironment {
    #[default]
    Sandbox,
    Live,
}

impl GoCardlessEnvironment {
    /// API base URL for this environment
    pub fn api_base(&self) -> &'static str {
        match self {
            GoCardlessEnvironment::Sandbox => "https://api-sandbox.gocardless.com",
            GoCardlessEnvironment::Live => "https://api.gocardless.com",
        }
    }
}

impl GoCardlessConfig {
    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let token = self.access_token.expose_secret();
        if token.is_empty() {
            return Err(ValidationError::MissingRequired("GOCARDLESS_ACCESS_TOKEN"));
        }
        // Tokens are issued per environment; sandbox tokens carry a marker
        if self.environment == GoCardlessEnvironment::Live && token.contains("sandbox") {
            return Err(ValidationError::InvalidGoCardlessToken);
        }
        if self.webhook_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired(
                "GOCARDLESS_WEBHOOK_SECRET",
            ));
        }
        Ok(())
    }
}
