//! Pipeline Run Store Port - inspectable records of claim pipeline runs.

use async_trait::async_trait;

use crate::domain::claims::PipelineRun;
use crate::domain::foundation::{ConversationId, DomainError};

#[async_trait]
pub trait PipelineRunStore: Send + Sync {
    /// Inserts or replaces a run.
    async fn save(&self, run: &PipelineRun) -> Result<(), DomainError>;

    /// Most recently started run for the conversation.
    async fn latest_for(&self, conversation_id: &ConversationId) -> Result<Option<PipelineRun>, DomainError>;
}
