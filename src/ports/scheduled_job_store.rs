//! Scheduled Job Store Port - status records of deferred messages.

use async_trait::async_trait;

use crate::domain::foundation::{ConversationId, DomainError, JobId};
use crate::domain::scheduling::ScheduledMessageJob;

/// Port for scheduled job records.
#[async_trait]
pub trait ScheduledJobStore: Send + Sync {
    /// Inserts or replaces a job record.
    async fn save(&self, job: &ScheduledMessageJob) -> Result<(), DomainError>;

    async fn find(&self, id: &JobId) -> Result<Option<ScheduledMessageJob>, DomainError>;

    /// All jobs of a conversation in scheduling order.
    async fn list_for_conversation(&self, conversation_id: &ConversationId) -> Result<Vec<ScheduledMessageJob>, DomainError>;
}
