//! Scripted claim submitter for tests and offline runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::claims::{ClaimReceipt, ClaimRequest};
use crate::ports::{ClaimError, ClaimSubmitter};

/// Returns queued results in order. Once the queue is empty every call
/// succeeds with generated ids.
#[derive(Debug, Clone, Default)]
pub struct MockClaimSubmitter {
    results: Arc<Mutex<VecDeque<Result<ClaimReceipt, ClaimError>>>>,
    requests: Arc<Mutex<Vec<ClaimRequest>>>,
    delay: Duration,
}

impl MockClaimSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_receipt(self, intimation_id: impl Into<String>, request_id: impl Into<String>) -> Self {
        self.results.lock().unwrap().push_back(Ok(ClaimReceipt {
            intimation_id: intimation_id.into(),
            request_id: request_id.into(),
        }));
        self
    }

    pub fn with_error(self, error: ClaimError) -> Self {
        self.results.lock().unwrap().push_back(Err(error));
        self
    }

    /// Simulated latency per attempt.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn attempts(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ClaimRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClaimSubmitter for MockClaimSubmitter {
    async fn submit(&self, request: &ClaimRequest) -> Result<ClaimReceipt, ClaimError> {
        let attempt = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = self.results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(ClaimReceipt {
                intimation_id: format!("INT-MOCK-{:04}", attempt),
                request_id: format!("REQ-MOCK-{:04}", attempt),
            })
        })
    }
}
