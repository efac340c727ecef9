//! In-Memory Journey Repository Adapter

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{CustomerId, DomainError};
use crate::domain::journey::Journey;
use crate::ports::JourneyRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryJourneyRepository {
    journeys: Arc<RwLock<HashMap<CustomerId, Journey>>>,
}

impl InMemoryJourneyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JourneyRepository for InMemoryJourneyRepository {
    async fn save(&self, journey: &Journey) -> Result<(), DomainError> {
        self.journeys
            .write()
            .await
            .insert(journey.customer_id.clone(), journey.clone());
        Ok(())
    }

    async fn find_by_customer(&self, customer_id: &CustomerId) -> Result<Option<Journey>, DomainError> {
        Ok(self.journeys.read().await.get(customer_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journey::Intent;

    #[tokio::test]
    async fn saving_replaces_previous_mapping() {
        let repo = InMemoryJourneyRepository::new();
        let customer = CustomerId::new("cust-1").unwrap();

        let first = Journey::start(customer.clone(), Intent::HospitalAdmissionClaim);
        let second = Journey::start(customer.clone(), Intent::HospitalAdmissionClaim);
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        let found = repo.find_by_customer(&customer).await.unwrap().unwrap();
        assert_eq!(found.conversation_id, second.conversation_id);
    }
}
