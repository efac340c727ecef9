//! Follow-up scheduling configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    /// Gap before each follow-up, in seconds
    #[serde(default = "default_followup_delay")]
    pub followup_delay_secs: u64,

    /// Rewrite follow-ups through the text generator before sending
    #[serde(default = "default_humanize")]
    pub humanize: bool,

    /// Transcript entries handed to the text generator
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl SchedulingConfig {
    pub fn followup_delay(&self) -> Duration {
        Duration::from_secs(self.followup_delay_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_window == 0 || self.history_window > 50 {
            return Err(ValidationError::InvalidHistoryWindow);
        }
        Ok(())
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            followup_delay_secs: default_followup_delay(),
            humanize: default_humanize(),
            history_window: default_history_window(),
        }
    }
}

fn default_followup_delay() -> u64 {
    10
}

fn default_humanize() -> bool {
    true
}

fn default_history_window() -> usize {
    6
}
