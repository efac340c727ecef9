//! In-Memory Scheduled Job Store Adapter

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ConversationId, DomainError, JobId};
use crate::domain::scheduling::ScheduledMessageJob;
use crate::ports::ScheduledJobStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryJobStore {
    jobs: Arc<RwLock<HashMap<JobId, ScheduledMessageJob>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduledJobStore for InMemoryJobStore {
    async fn save(&self, job: &ScheduledMessageJob) -> Result<(), DomainError> {
        self.jobs.write().await.insert(job.id, job.clone());
        Ok(())
    }

    async fn find(&self, id: &JobId) -> Result<Option<ScheduledMessageJob>, DomainError> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn list_for_conversation(&self, conversation_id: &ConversationId) -> Result<Vec<ScheduledMessageJob>, DomainError> {
        let mut jobs: Vec<ScheduledMessageJob> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| job.conversation_id == *conversation_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| {
            a.scheduled_at
                .cmp(&b.scheduled_at)
                .then_with(|| a.sequence.cmp(&b.sequence))
        });
        Ok(jobs)
    }
}
