//! Candidate Search Port - finds hospitals for a department and location.

use async_trait::async_trait;

use crate::domain::hospital::{Department, HospitalRecord};

/// What to look for.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub department: Department,
    pub location_hint: Option<String>,
    pub limit: usize,
}

/// Search and classification errors. Never fatal to a turn.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("classification failed: {0}")]
    Classification(String),

    #[error("catalog unavailable: {0}")]
    Catalog(String),
}

/// Port for hospital lookup.
#[async_trait]
pub trait CandidateSearch: Send + Sync {
    /// Ranked candidates, best first, at most `query.limit` of them.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<HospitalRecord>, SearchError>;
}
