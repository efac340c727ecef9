//! In-memory dispatcher that records every message. Useful for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::{CustomerId, Timestamp};
use crate::ports::{DispatchError, MessageDispatcher};

/// A message accepted by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub customer_id: CustomerId,
    pub text: String,
    pub sent_at: Timestamp,
}

/// Records sent messages; queued failures are returned first.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDispatcher {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failures: Arc<Mutex<VecDeque<DispatchError>>>,
}

impl InMemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next send fail with the given error.
    pub fn fail_next(&self, error: DispatchError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.text.clone()).collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageDispatcher for InMemoryDispatcher {
    async fn send(&self, customer_id: &CustomerId, text: &str) -> Result<(), DispatchError> {
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.sent.lock().unwrap().push(SentMessage {
            customer_id: customer_id.clone(),
            text: text.to_string(),
            sent_at: Timestamp::now(),
        });
        Ok(())
    }
}
