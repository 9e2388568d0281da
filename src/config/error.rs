//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Public base URL must be absolute (http:// or https://)")]
    InvalidPublicBaseUrl,

    #[error("Public base URL must use HTTPS in the live gateway environment")]
    PublicBaseUrlMustBeHttps,

    #[error("Invalid GoCardless access token format")]
    InvalidGoCardlessToken,

    #[error("Invalid Resend API key format")]
    InvalidResendKey,

    #[error("Invalid email address")]
    InvalidEmailAddress,
}
