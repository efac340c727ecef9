//! Journey Repository Port - customer to active conversation mapping.

use async_trait::async_trait;

use crate::domain::foundation::{CustomerId, DomainError};
use crate::domain::journey::Journey;

/// Port for journey persistence. One journey per customer is kept; saving a
/// new one replaces the previous mapping.
#[async_trait]
pub trait JourneyRepository: Send + Sync {
    async fn save(&self, journey: &Journey) -> Result<(), DomainError>;

    /// Latest journey of the customer, active or closed.
    async fn find_by_customer(&self, customer_id: &CustomerId) -> Result<Option<Journey>, DomainError>;
}
