//! Claims API configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::claims::{Backoff, RetryPolicy};

/// Claims API endpoint and retry policy.
///
/// Without a `base_url` the service runs against the mock submitter.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimsConfig {
    pub base_url: Option<String>,

    pub api_key: Option<SecretString>,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    #[serde(default)]
    pub backoff: Backoff,
}

impl ClaimsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms), self.backoff)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidUrl("claims.base_url"));
            }
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(ValidationError::InvalidMaxAttempts);
        }
        if self.retry_delay_ms > 60_000 {
            return Err(ValidationError::RetryDelayTooLong);
        }
        Ok(())
    }
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay(),
            backoff: Backoff::default(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2000
}
