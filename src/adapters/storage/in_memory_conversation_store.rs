//! In-Memory Conversation Store Adapter
//!
//! Keeps conversation state in a map behind a tokio `RwLock`. `update` holds
//! the write lock for the whole mutation, so concurrent writers of the same
//! conversation are serialized.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ConversationId, DomainError, ErrorCode};
use crate::domain::journey::ConversationState;
use crate::ports::{ConversationStore, StateMutation};

#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    states: Arc<RwLock<HashMap<ConversationId, ConversationState>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn save(&self, state: &ConversationState) -> Result<(), DomainError> {
        self.states
            .write()
            .await
            .insert(state.conversation_id, state.clone());
        Ok(())
    }

    async fn find(&self, id: &ConversationId) -> Result<Option<ConversationState>, DomainError> {
        Ok(self.states.read().await.get(id).cloned())
    }

    async fn update(&self, id: &ConversationId, mutation: StateMutation) -> Result<ConversationState, DomainError> {
        let mut states = self.states.write().await;
        let state = states.get_mut(id).ok_or_else(|| {
            DomainError::new(ErrorCode::ConversationNotFound, "conversation not found")
                .with_detail("conversation_id", id.to_string())
        })?;
        mutation(state);
        Ok(state.clone())
    }
}
