//! Message Dispatcher Port - outbound delivery to the customer's channel.

use async_trait::async_trait;

use crate::domain::foundation::CustomerId;

/// Delivery errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("delivery rejected: {0}")]
    Rejected(String),

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Port for sending a message to a customer.
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    async fn send(&self, customer_id: &CustomerId, text: &str) -> Result<(), DispatchError>;
}
