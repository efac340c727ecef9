//! Per-conversation state: current stage, collected data, stage history and transcript.

use serde::{Deserialize, Serialize};

use super::collected::CollectedData;
use super::stage::{Intent, StageId};
use crate::domain::foundation::{ConversationId, CustomerId, Timestamp};

/// One entry of the stage-visit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageVisit {
    pub stage: StageId,
    pub entered_at: Timestamp,
}

/// Who said something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Customer,
    Assistant,
}

/// One line of the conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub content: String,
    pub at: Timestamp,
}

/// State of a single conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub conversation_id: ConversationId,
    pub customer_id: CustomerId,
    pub intent: Intent,
    /// `None` until the first turn; resolves to the graph's start stage.
    pub current_stage: Option<StageId>,
    pub collected: CollectedData,
    pub stage_history: Vec<StageVisit>,
    pub transcript: Vec<TranscriptEntry>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ConversationState {
    /// Creates an empty, not-yet-started conversation.
    pub fn new(conversation_id: ConversationId, customer_id: CustomerId, intent: Intent) -> Self {
        let now = Timestamp::now();
        Self {
            conversation_id,
            customer_id,
            intent,
            current_stage: None,
            collected: CollectedData::new(),
            stage_history: Vec::new(),
            transcript: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves to a stage, recording the visit when the stage actually changes.
    pub fn enter_stage(&mut self, stage: StageId) {
        if self.current_stage == Some(stage) {
            return;
        }
        let now = Timestamp::now();
        self.current_stage = Some(stage);
        self.stage_history.push(StageVisit {
            stage,
            entered_at: now,
        });
        self.updated_at = now;
    }

    /// Folds a patch into the collected data.
    pub fn merge(&mut self, patch: CollectedData) {
        if patch.is_empty() {
            return;
        }
        self.collected.merge(patch);
        self.updated_at = Timestamp::now();
    }

    pub fn record_customer(&mut self, content: impl Into<String>) {
        self.record(Speaker::Customer, content.into());
    }

    pub fn record_assistant(&mut self, content: impl Into<String>) {
        self.record(Speaker::Assistant, content.into());
    }

    fn record(&mut self, speaker: Speaker, content: String) {
        let at = Timestamp::now();
        self.transcript.push(TranscriptEntry { speaker, content, at });
        self.updated_at = at;
    }

    /// The last `window` transcript entries, oldest first.
    pub fn recent_transcript(&self, window: usize) -> &[TranscriptEntry] {
        let start = self.transcript.len().saturating_sub(window);
        &self.transcript[start..]
    }

    /// Stage ids in the order they were entered.
    pub fn visited_stages(&self) -> Vec<StageId> {
        self.stage_history.iter().map(|v| v.stage).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journey::collected::{Field, FieldValue};

    fn state() -> ConversationState {
        ConversationState::new(
            ConversationId::new(),
            CustomerId::new("cust-1").unwrap(),
            Intent::HospitalAdmissionClaim,
        )
    }

    #[test]
    fn starts_without_stage() {
        let s = state();
        assert!(s.current_stage.is_none());
        assert!(s.stage_history.is_empty());
    }

    #[test]
    fn enter_stage_records_changes_only() {
        let mut s = state();
        s.enter_stage(StageId::Greeting);
        s.enter_stage(StageId::Greeting);
        s.enter_stage(StageId::IdentifyPatient);

        assert_eq!(s.current_stage, Some(StageId::IdentifyPatient));
        assert_eq!(s.visited_stages(), vec![StageId::Greeting, StageId::IdentifyPatient]);
    }

    #[test]
    fn merge_accumulates() {
        let mut s = state();
        s.merge(CollectedData::new().with(Field::PatientRelation, FieldValue::text("spouse")));
        s.merge(CollectedData::new().with(Field::MedicalReason, FieldValue::text("fracture")));
        assert_eq!(s.collected.len(), 2);
    }

    #[test]
    fn recent_transcript_is_windowed() {
        let mut s = state();
        for i in 0..5 {
            s.record_customer(format!("message {}", i));
        }
        let recent = s.recent_transcript(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "message 3");
        assert_eq!(s.recent_transcript(10).len(), 5);
    }

    #[test]
    fn serializes_round_trip() {
        let mut s = state();
        s.enter_stage(StageId::Greeting);
        let json = serde_json::to_string(&s).unwrap();
        let back: ConversationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
