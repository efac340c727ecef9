//! In-Memory Pipeline Run Store Adapter

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::claims::PipelineRun;
use crate::domain::foundation::{ConversationId, DomainError, PipelineRunId};
use crate::ports::PipelineRunStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryPipelineRunStore {
    runs: Arc<RwLock<HashMap<PipelineRunId, PipelineRun>>>,
}

impl InMemoryPipelineRunStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PipelineRunStore for InMemoryPipelineRunStore {
    async fn save(&self, run: &PipelineRun) -> Result<(), DomainError> {
        self.runs.write().await.insert(run.id, run.clone());
        Ok(())
    }

    async fn latest_for(&self, conversation_id: &ConversationId) -> Result<Option<PipelineRun>, DomainError> {
        Ok(self
            .runs
            .read()
            .await
            .values()
            .filter(|run| run.conversation_id == *conversation_id)
            .max_by_key(|run| run.started_at)
            .cloned())
    }
}
