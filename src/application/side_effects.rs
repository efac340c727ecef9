//! Stage-entry side effects: hospital search and claim submission.
//!
//! Search failures are soft. They produce an empty patch so the stage stays
//! put and retries on the next turn. Claim submission retries transient
//! failures sequentially under a [`RetryPolicy`] and reports a [`ClaimOutcome`]
//! instead of an error.

use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::domain::claims::{ClaimOutcome, ClaimRequest, RetryPolicy};
use crate::domain::hospital::Department;
use crate::domain::journey::{CollectedData, Field, FieldValue};
use crate::ports::{CandidateSearch, ClaimSubmitter, DepartmentClassifier, SearchQuery};

pub struct SideEffectExecutor {
    classifier: Arc<dyn DepartmentClassifier>,
    search: Arc<dyn CandidateSearch>,
    submitter: Arc<dyn ClaimSubmitter>,
    retry: RetryPolicy,
    max_results: usize,
}

impl SideEffectExecutor {
    pub fn new(
        classifier: Arc<dyn DepartmentClassifier>,
        search: Arc<dyn CandidateSearch>,
        submitter: Arc<dyn ClaimSubmitter>,
    ) -> Self {
        Self {
            classifier,
            search,
            submitter,
            retry: RetryPolicy::default(),
            max_results: 5,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Classifies the medical reason and looks up matching hospitals.
    ///
    /// The returned patch carries `hospital_options` only when something was
    /// found. A reason no department matches is searched under general
    /// medicine, which every catalog is expected to cover.
    pub async fn search_candidates(&self, data: &CollectedData) -> CollectedData {
        let mut patch = CollectedData::new();
        let Some(reason) = data.text(Field::MedicalReason) else {
            debug!("No medical reason collected, skipping hospital search");
            return patch;
        };

        let department = match self.classifier.classify(reason).await {
            Ok(Some(department)) => department,
            Ok(None) => {
                debug!(reason, "Medical reason did not map to a department, using general medicine");
                Department::GeneralMedicine
            }
            Err(e) => {
                warn!(error = %e, "Department classification failed");
                return patch;
            }
        };
        patch.insert(Field::Department, FieldValue::text(department.as_str()));

        let query = SearchQuery {
            department,
            location_hint: data.text(Field::LocationHint).map(str::to_string),
            limit: self.max_results,
        };
        match self.search.search(&query).await {
            Ok(hospitals) if !hospitals.is_empty() => {
                debug!(%department, found = hospitals.len(), "Hospital search returned candidates");
                patch.insert(Field::HospitalOptions, FieldValue::Candidates(hospitals));
            }
            Ok(_) => {
                info!(%department, location = ?query.location_hint, "Hospital search found nothing");
            }
            Err(e) => {
                warn!(%department, error = %e, "Hospital search failed");
            }
        }
        patch
    }

    /// Submits the claim, retrying transient failures.
    pub async fn submit_claim(&self, request: &ClaimRequest) -> ClaimOutcome {
        let mut attempt = 1;
        loop {
            match self.submitter.submit(request).await {
                Ok(receipt) => {
                    info!(
                        attempt,
                        intimation_id = %receipt.intimation_id,
                        "Claim intimation accepted"
                    );
                    return ClaimOutcome::Confirmed {
                        receipt,
                        attempts: attempt,
                    };
                }
                Err(e) if e.is_transient() && self.retry.allows(attempt + 1) => {
                    let delay = self.retry.delay_before(attempt + 1);
                    warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Claim submission failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(attempt, transient = e.is_transient(), error = %e, "Claim submission failed");
                    return ClaimOutcome::Failed {
                        error: e.to_string(),
                        attempts: attempt,
                    };
                }
            }
        }
    }
}
