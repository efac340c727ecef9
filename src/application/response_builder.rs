//! Builds the outgoing reply for a turn.
//!
//! The text generator gets the stage's response hint, the facts collected so
//! far and a short transcript window. Any generation failure, or a reply that
//! does not survive sanitizing, falls back to the stage's template so a turn
//! always has text to send.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::journey::prompts::{fallback_reply, stage_context};
use crate::domain::journey::{ConversationState, Speaker, Stage, TranscriptEntry};
use crate::ports::{ChatMessage, GenerationRequest, TextGenerator};

/// Longest reply we are willing to forward to a messaging channel.
const MAX_REPLY_LENGTH: usize = 2_000;

const SYSTEM_PROMPT: &str = "You are a courteous health insurance assistant helping a policyholder \
arrange a hospital admission and register a cashless claim. Reply in two or three short sentences. \
Never invent hospitals, ids, dates or amounts that are not listed in the facts below.";

const REPLY_MAX_TOKENS: u32 = 300;

/// Reasons a generated reply is discarded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplyRejected {
    #[error("reply is empty")]
    Empty,

    #[error("reply too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },
}

/// Cleans generated text before it reaches the customer.
#[derive(Debug, Clone, Default)]
pub struct ReplySanitizer;

impl ReplySanitizer {
    const ROLE_MARKERS: [&'static str; 8] = [
        "<|system|>",
        "<|assistant|>",
        "<|user|>",
        "<|im_start|>",
        "<|im_end|>",
        "[INST]",
        "[/INST]",
        "<<SYS>>",
    ];

    pub fn sanitize(&self, reply: &str) -> Result<String, ReplyRejected> {
        if reply.len() > MAX_REPLY_LENGTH {
            return Err(ReplyRejected::TooLong {
                max: MAX_REPLY_LENGTH,
                actual: reply.len(),
            });
        }

        let mut cleaned: String = reply
            .chars()
            .filter(|c| !c.is_control() || *c == '\n')
            .collect();
        for marker in Self::ROLE_MARKERS {
            cleaned = cleaned.replace(marker, "");
        }

        let cleaned = cleaned.trim().trim_matches('"').trim().to_string();
        if cleaned.is_empty() {
            return Err(ReplyRejected::Empty);
        }
        Ok(cleaned)
    }
}

/// Turns a transcript window into chat history.
pub fn history_messages(entries: &[TranscriptEntry]) -> Vec<ChatMessage> {
    entries
        .iter()
        .map(|entry| match entry.speaker {
            Speaker::Customer => ChatMessage::user(entry.content.clone()),
            Speaker::Assistant => ChatMessage::assistant(entry.content.clone()),
        })
        .collect()
}

pub struct ResponseBuilder {
    generator: Arc<dyn TextGenerator>,
    sanitizer: ReplySanitizer,
    history_window: usize,
}

impl ResponseBuilder {
    pub fn new(generator: Arc<dyn TextGenerator>, history_window: usize) -> Self {
        Self {
            generator,
            sanitizer: ReplySanitizer,
            history_window: history_window.max(1),
        }
    }

    /// Reply for the stage the conversation just landed on.
    pub async fn reply(&self, stage: &Stage, state: &ConversationState) -> String {
        let fallback = fallback_reply(stage.id, &state.collected);
        let system = format!(
            "{}\n\nInstructions for this step: {}\n\nFacts:\n{}\n\nIf unsure, say something close to: {}",
            SYSTEM_PROMPT,
            stage.response_hint,
            stage_context(stage, &state.collected),
            fallback
        );
        let request = GenerationRequest::new()
            .with_system_prompt(system)
            .with_messages(history_messages(state.recent_transcript(self.history_window)))
            .with_max_tokens(REPLY_MAX_TOKENS)
            .with_temperature(0.4);

        match self.generator.generate(request).await {
            Ok(text) => match self.sanitizer.sanitize(&text) {
                Ok(reply) => reply,
                Err(reason) => {
                    warn!(stage = %stage.id, %reason, "Discarding generated reply");
                    fallback
                }
            },
            Err(e) => {
                debug!(
                    stage = %stage.id,
                    provider = self.generator.provider_name(),
                    error = %e,
                    "Text generation unavailable, using template reply"
                );
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockTextGenerator;
    use crate::domain::foundation::{ConversationId, CustomerId};
    use crate::domain::journey::{Intent, StageGraph, StageId};
    use crate::ports::{ChatRole, TextGenerationError};

    fn state() -> ConversationState {
        let mut state = ConversationState::new(
            ConversationId::new(),
            CustomerId::new("cust-1").unwrap(),
            Intent::HospitalAdmissionClaim,
        );
        state.record_customer("hello");
        state.record_assistant("Hi! Shall we begin?");
        state.record_customer("yes");
        state
    }

    mod sanitizer {
        use super::*;

        #[test]
        fn strips_control_chars_and_role_markers() {
            let cleaned = ReplySanitizer.sanitize("<|assistant|>Hello\u{0007} there\n").unwrap();
            assert_eq!(cleaned, "Hello there");
        }

        #[test]
        fn strips_wrapping_quotes() {
            assert_eq!(ReplySanitizer.sanitize("\"Sure.\"").unwrap(), "Sure.");
        }

        #[test]
        fn rejects_blank_and_oversized() {
            assert_eq!(ReplySanitizer.sanitize("  \n "), Err(ReplyRejected::Empty));
            let long = "a".repeat(MAX_REPLY_LENGTH + 1);
            assert!(matches!(
                ReplySanitizer.sanitize(&long),
                Err(ReplyRejected::TooLong { .. })
            ));
        }
    }

    mod reply {
        use super::*;

        #[tokio::test]
        async fn uses_generated_text() {
            let generator = Arc::new(MockTextGenerator::new().with_response("  Who is being admitted?  "));
            let builder = ResponseBuilder::new(generator.clone(), 6);
            let graph = StageGraph::for_intent(Intent::HospitalAdmissionClaim);

            let reply = builder.reply(graph.stage(StageId::IdentifyPatient), &state()).await;

            assert_eq!(reply, "Who is being admitted?");
            let calls = generator.get_calls();
            assert_eq!(calls.len(), 1);
            assert!(calls[0].system_prompt.as_deref().unwrap().contains("identify_patient"));
        }

        #[tokio::test]
        async fn history_is_windowed() {
            let generator = Arc::new(MockTextGenerator::new().with_response("ok"));
            let builder = ResponseBuilder::new(generator.clone(), 2);
            let graph = StageGraph::for_intent(Intent::HospitalAdmissionClaim);

            builder.reply(graph.stage(StageId::IdentifyPatient), &state()).await;

            let messages = &generator.get_calls()[0].messages;
            assert_eq!(messages.len(), 2);
            assert_eq!(messages[0].role, ChatRole::Assistant);
            assert_eq!(messages[1].content, "yes");
        }

        #[tokio::test]
        async fn falls_back_to_template_on_error() {
            let generator = Arc::new(MockTextGenerator::new().with_error(TextGenerationError::RateLimited));
            let builder = ResponseBuilder::new(generator, 6);
            let graph = StageGraph::for_intent(Intent::HospitalAdmissionClaim);
            let s = state();

            let reply = builder.reply(graph.stage(StageId::IdentifyPatient), &s).await;

            assert_eq!(reply, fallback_reply(StageId::IdentifyPatient, &s.collected));
        }

        #[tokio::test]
        async fn falls_back_when_generated_text_is_blank() {
            let generator = Arc::new(MockTextGenerator::new().with_response("   "));
            let builder = ResponseBuilder::new(generator, 6);
            let graph = StageGraph::for_intent(Intent::HospitalAdmissionClaim);
            let s = state();

            let reply = builder.reply(graph.stage(StageId::MedicalReason), &s).await;

            assert_eq!(reply, fallback_reply(StageId::MedicalReason, &s.collected));
        }
    }
}
