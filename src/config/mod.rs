//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `SPACEFED_` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use spacefed_members::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod database;
mod email;
mod error;
mod gocardless;
mod server;

pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use gocardless::{GoCardlessConfig, GoCardlessEnvironment};
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, public base URL)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment gateway configuration (GoCardless)
    pub gocardless: GoCardlessConfig,

    /// Email configuration (Resend)
    pub email: EmailConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `SPACEFED` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SPACEFED__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SPACEFED__DATABASE__URL=...` -> `database.url = ...`
    /// - `SPACEFED__GOCARDLESS__ACCESS_TOKEN=...` -> `gocardless.access_token = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or
    /// values cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SPACEFED")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.gocardless.validate()?;
        self.email.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var(
            "SPACEFED__DATABASE__URL",
            "postgresql://test@localhost/members",
        );
        env::set_var("SPACEFED__GOCARDLESS__ACCESS_TOKEN", "sandbox_abc123");
        env::set_var("SPACEFED__GOCARDLESS__WEBHOOK_SECRET", "whsecret");
        env::set_var("SPACEFED__EMAIL__RESEND_API_KEY", "re_xxx");
        env::set_var("SPACEFED__EMAIL__APPROVER_ADDRESS", "board@spacefed.org");
    }

    fn clear_env() {
        env::remove_var("SPACEFED__DATABASE__URL");
        env::remove_var("SPACEFED__GOCARDLESS__ACCESS_TOKEN");
        env::remove_var("SPACEFED__GOCARDLESS__WEBHOOK_SECRET");
        env::remove_var("SPACEFED__GOCARDLESS__ENVIRONMENT");
        env::remove_var("SPACEFED__EMAIL__RESEND_API_KEY");
        env::remove_var("SPACEFED__EMAIL__APPROVER_ADDRESS");
        env::remove_var("SPACEFED__SERVER__PORT");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/members");
        assert_eq!(
            config.gocardless.environment,
            GoCardlessEnvironment::Sandbox
        );
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok());
        assert!(result.unwrap().validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_live_environment_parses() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("SPACEFED__GOCARDLESS__ENVIRONMENT", "live");
        env::set_var("SPACEFED__GOCARDLESS__ACCESS_TOKEN", "live_abc123");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.gocardless.environment, GoCardlessEnvironment::Live);
        assert!(config.validate().is_ok());
    }
}
