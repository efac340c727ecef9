//! Hospital search configuration

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Hospitals offered per search
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_results == 0 || self.max_results > 20 {
            return Err(ValidationError::InvalidMaxResults);
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    5
}
