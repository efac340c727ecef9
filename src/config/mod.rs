//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `CARE_JOURNEY` prefix and
//! `__` between nested keys. Every section has defaults, so an empty
//! environment yields a runnable offline setup (template replies, mock
//! claims API, log-only messaging).
//!
//! # Example
//!
//! ```no_run
//! use care_journey::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod claims;
mod error;
mod messaging;
mod profile;
mod scheduling;
mod search;
mod server;

pub use ai::AiConfig;
pub use claims::ClaimsConfig;
pub use error::{ConfigError, ValidationError};
pub use messaging::MessagingConfig;
pub use profile::ProfileConfig;
pub use scheduling::SchedulingConfig;
pub use search::SearchConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Text generation provider
    #[serde(default)]
    pub ai: AiConfig,

    /// Claims API and retry policy
    #[serde(default)]
    pub claims: ClaimsConfig,

    /// Follow-up scheduling
    #[serde(default)]
    pub scheduling: SchedulingConfig,

    /// Hospital search
    #[serde(default)]
    pub search: SearchConfig,

    /// Policyholder record sent with every claim
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Outbound messaging gateway
    #[serde(default)]
    pub messaging: MessagingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `CARE_JOURNEY__*` variables.
    ///
    /// - `CARE_JOURNEY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CARE_JOURNEY__CLAIMS__BASE_URL=...` -> `claims.base_url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CARE_JOURNEY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.claims.validate()?;
        self.scheduling.validate()?;
        self.search.validate()?;
        self.messaging.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
