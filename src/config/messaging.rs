//! Outbound messaging configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Without a `gateway_url`, outbound messages are written to the log.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    pub gateway_url: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl MessagingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.gateway_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidUrl("messaging.gateway_url"));
            }
        }
        Ok(())
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
