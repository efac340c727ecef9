//! Conversation Store Port - keyed storage of conversation state.

use async_trait::async_trait;

use crate::domain::foundation::{ConversationId, DomainError};
use crate::domain::journey::ConversationState;

/// In-place mutation applied atomically by [`ConversationStore::update`].
pub type StateMutation = Box<dyn FnOnce(&mut ConversationState) + Send>;

/// Port for conversation state persistence.
///
/// Implementations must apply `update` atomically with respect to other
/// writers of the same conversation, so background work and turns never
/// overwrite each other's fields.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Inserts or replaces a conversation.
    async fn save(&self, state: &ConversationState) -> Result<(), DomainError>;

    /// Returns `None` if the conversation does not exist.
    async fn find(&self, id: &ConversationId) -> Result<Option<ConversationState>, DomainError>;

    /// Applies a mutation and returns the updated state.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` if the conversation doesn't exist
    async fn update(&self, id: &ConversationId, mutation: StateMutation) -> Result<ConversationState, DomainError>;
}
