//! Mock text generator for testing.
//!
//! Returns queued responses in order, then echoes a fixed reply. Every call
//! is recorded for verification.
//!
//! # Example
//!
//! ```ignore
//! let generator = MockTextGenerator::new()
//!     .with_response("Hello, how can I help?")
//!     .with_error(TextGenerationError::RateLimited);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{GenerationRequest, TextGenerationError, TextGenerator};

/// Mock text generator.
#[derive(Debug, Clone, Default)]
pub struct MockTextGenerator {
    responses: Arc<Mutex<VecDeque<Result<String, TextGenerationError>>>>,
    fallback: Option<String>,
    delay: Duration,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator that always fails, as if no provider were configured.
    pub fn unavailable() -> Self {
        Self::new()
    }

    /// Queues a successful response.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(content.into()));
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: TextGenerationError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Reply used once the queue is empty. Without one, calls fail with `NotConfigured`.
    pub fn with_fallback(mut self, content: impl Into<String>) -> Self {
        self.fallback = Some(content.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, TextGenerationError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => self.fallback.clone().ok_or(TextGenerationError::NotConfigured),
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_queued_responses_in_order() {
        let generator = MockTextGenerator::new()
            .with_response("first")
            .with_error(TextGenerationError::RateLimited)
            .with_fallback("later");

        assert_eq!(generator.generate(GenerationRequest::new()).await.unwrap(), "first");
        assert_eq!(
            generator.generate(GenerationRequest::new()).await.unwrap_err(),
            TextGenerationError::RateLimited
        );
        assert_eq!(generator.generate(GenerationRequest::new()).await.unwrap(), "later");
        assert_eq!(generator.call_count(), 3);
    }

    #[tokio::test]
    async fn unavailable_always_fails() {
        let generator = MockTextGenerator::unavailable();
        assert_eq!(
            generator.generate(GenerationRequest::new()).await.unwrap_err(),
            TextGenerationError::NotConfigured
        );
    }
}
