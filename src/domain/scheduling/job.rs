//! Scheduled follow-up message jobs and their lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, CustomerId, JobId, StateMachine, Timestamp, ValidationError};
use crate::domain::journey::Intent;

/// Lifecycle of a scheduled message.
///
/// `Scheduled` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Scheduled,
    /// Dispatcher accepted the message.
    Sent,
    /// Dispatcher reported a delivery failure.
    Failed,
    Cancelled,
    /// Something other than delivery went wrong while firing.
    Error,
}

impl JobStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, JobStatus::Scheduled)
    }
}

impl StateMachine for JobStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use JobStatus::*;
        matches!(
            (self, target),
            (Scheduled, Sent) | (Scheduled, Failed) | (Scheduled, Cancelled) | (Scheduled, Error)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use JobStatus::*;
        match self {
            Scheduled => vec![Sent, Failed, Cancelled, Error],
            Sent | Failed | Cancelled | Error => vec![],
        }
    }
}

/// One message to be scheduled, with its delay relative to the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSpec {
    pub text: String,
    pub delay_ms: u64,
}

impl MessageSpec {
    pub fn new(text: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            text: text.into(),
            delay_ms,
        }
    }
}

/// A single deferred message send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMessageJob {
    pub id: JobId,
    pub conversation_id: ConversationId,
    pub customer_id: CustomerId,
    pub intent: Intent,
    /// Position within its scheduling call, starting at zero.
    pub sequence: usize,
    pub text: String,
    pub scheduled_at: Timestamp,
    /// Cumulative delay from the moment of scheduling.
    pub delay_ms: u64,
    pub status: JobStatus,
    /// Text actually dispatched, after humanizing.
    pub sent_text: Option<String>,
    pub error: Option<String>,
    pub updated_at: Timestamp,
}

impl ScheduledMessageJob {
    pub fn new(
        conversation_id: ConversationId,
        customer_id: CustomerId,
        intent: Intent,
        sequence: usize,
        text: String,
        scheduled_from: Timestamp,
        delay_ms: u64,
    ) -> Self {
        Self {
            id: JobId::new(),
            conversation_id,
            customer_id,
            intent,
            sequence,
            text,
            scheduled_at: scheduled_from.plus_millis(delay_ms),
            delay_ms,
            status: JobStatus::Scheduled,
            sent_text: None,
            error: None,
            updated_at: scheduled_from,
        }
    }

    fn transition(&mut self, target: JobStatus) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(target)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    pub fn mark_sent(&mut self, sent_text: String) -> Result<(), ValidationError> {
        self.transition(JobStatus::Sent)?;
        self.sent_text = Some(sent_text);
        Ok(())
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), ValidationError> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    pub fn mark_error(&mut self, error: impl Into<String>) -> Result<(), ValidationError> {
        self.transition(JobStatus::Error)?;
        self.error = Some(error.into());
        Ok(())
    }

    pub fn mark_cancelled(&mut self) -> Result<(), ValidationError> {
        self.transition(JobStatus::Cancelled)
    }
}

/// Builds job descriptors with cumulative delays: job k fires at
/// `from + delay_1 + ... + delay_k`.
pub fn plan_jobs(
    conversation_id: ConversationId,
    customer_id: &CustomerId,
    intent: Intent,
    messages: &[MessageSpec],
    from: Timestamp,
) -> Vec<ScheduledMessageJob> {
    let mut cumulative = 0u64;
    messages
        .iter()
        .enumerate()
        .map(|(sequence, message)| {
            cumulative = cumulative.saturating_add(message.delay_ms);
            ScheduledMessageJob::new(
                conversation_id,
                customer_id.clone(),
                intent,
                sequence,
                message.text.clone(),
                from,
                cumulative,
            )
        })
        .collect()
}
