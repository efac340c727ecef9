//! Static hospital catalog embedded at build time.
//!
//! Candidates are filtered by department and, when given, location; then
//! ranked by rating (ties by name).

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::cmp::Ordering;

use crate::domain::hospital::HospitalRecord;
use crate::ports::{CandidateSearch, SearchError, SearchQuery};

const EMBEDDED_CATALOG: &str = include_str!("hospitals.yaml");

static EMBEDDED: Lazy<Result<Vec<HospitalRecord>, String>> =
    Lazy::new(|| serde_yaml::from_str(EMBEDDED_CATALOG).map_err(|e| e.to_string()));

/// In-memory hospital list.
#[derive(Debug, Clone)]
pub struct StaticHospitalCatalog {
    hospitals: Vec<HospitalRecord>,
}

impl StaticHospitalCatalog {
    /// Loads the catalog shipped with the binary.
    pub fn embedded() -> Result<Self, SearchError> {
        EMBEDDED
            .as_ref()
            .map(|hospitals| Self::from_records(hospitals.clone()))
            .map_err(|e| SearchError::Catalog(format!("embedded catalog is invalid: {}", e)))
    }

    /// Parses a YAML list of hospital records.
    pub fn from_yaml(yaml: &str) -> Result<Self, SearchError> {
        serde_yaml::from_str(yaml)
            .map(Self::from_records)
            .map_err(|e| SearchError::Catalog(e.to_string()))
    }

    pub fn from_records(hospitals: Vec<HospitalRecord>) -> Self {
        Self { hospitals }
    }

    pub fn len(&self) -> usize {
        self.hospitals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hospitals.is_empty()
    }

    fn rank(a: &HospitalRecord, b: &HospitalRecord) -> Ordering {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    }
}

#[async_trait]
impl CandidateSearch for StaticHospitalCatalog {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<HospitalRecord>, SearchError> {
        let mut matches: Vec<HospitalRecord> = self
            .hospitals
            .iter()
            .filter(|h| h.cashless && h.treats(query.department))
            .filter(|h| match &query.location_hint {
                Some(place) => h.is_near(place),
                None => true,
            })
            .cloned()
            .collect();

        matches.sort_by(Self::rank);
        matches.truncate(query.limit);
        Ok(matches)
    }
}
