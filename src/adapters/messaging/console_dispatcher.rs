//! Dispatcher that writes messages to the log. Used when no gateway is configured.

use async_trait::async_trait;

use crate::domain::foundation::CustomerId;
use crate::ports::{DispatchError, MessageDispatcher};

#[derive(Debug, Clone, Default)]
pub struct ConsoleDispatcher;

impl ConsoleDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageDispatcher for ConsoleDispatcher {
    async fn send(&self, customer_id: &CustomerId, text: &str) -> Result<(), DispatchError> {
        tracing::info!(customer_id = %customer_id, text = %text, "outbound message");
        Ok(())
    }
}
