//! Text Generator Port - Interface for the external prose generator.
//!
//! The engine never depends on generated text being available: every caller
//! has a deterministic template to fall back to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for text generation (chat-completion style LLM APIs).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates prose for the request. Implementations return trimmed text.
    async fn generate(&self, request: GenerationRequest) -> Result<String, TextGenerationError>;

    /// Short provider name for logs.
    fn provider_name(&self) -> &str;
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A message in the history window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Prompt plus a short history window.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub system_prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Text generation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TextGenerationError {
    #[error("not configured")]
    NotConfigured,

    #[error("rate limited")]
    RateLimited,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("empty response")]
    EmptyResponse,
}
