//! Claim pipeline runs: the recorded, inspectable saga behind a claim submission.

use serde::{Deserialize, Serialize};

use super::request::ClaimReceipt;
use crate::domain::foundation::{ConversationId, PipelineRunId, StateMachine, Timestamp, ValidationError};

/// Steps of the claim saga.
///
/// ```text
/// Submitting -> Submitted -> StateUpdated -> Notified -> Scheduled
///      \____________\_____________\____________\_______-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    #[default]
    Submitting,
    Submitted,
    StateUpdated,
    Notified,
    Scheduled,
    Failed,
}

impl StateMachine for PipelineStep {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PipelineStep::*;
        matches!(
            (self, target),
            (Submitting, Submitted)
                | (Submitted, StateUpdated)
                | (StateUpdated, Notified)
                | (Notified, Scheduled)
                | (Submitting, Failed)
                | (Submitted, Failed)
                | (StateUpdated, Failed)
                | (Notified, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PipelineStep::*;
        match self {
            Submitting => vec![Submitted, Failed],
            Submitted => vec![StateUpdated, Failed],
            StateUpdated => vec![Notified, Failed],
            Notified => vec![Scheduled, Failed],
            Scheduled | Failed => vec![],
        }
    }
}

/// When a step was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: PipelineStep,
    pub at: Timestamp,
}

/// Final result of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Confirmed { receipt: ClaimReceipt, attempts: u32 },
    Failed { error: String, attempts: u32 },
}

impl ClaimOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            ClaimOutcome::Confirmed { attempts, .. } | ClaimOutcome::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, ClaimOutcome::Confirmed { .. })
    }
}

/// One background claim run for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: PipelineRunId,
    pub conversation_id: ConversationId,
    pub step: PipelineStep,
    pub steps: Vec<StepRecord>,
    pub outcome: Option<ClaimOutcome>,
    pub failure_reason: Option<String>,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

impl PipelineRun {
    pub fn start(conversation_id: ConversationId) -> Self {
        let now = Timestamp::now();
        Self {
            id: PipelineRunId::new(),
            conversation_id,
            step: PipelineStep::Submitting,
            steps: vec![StepRecord {
                step: PipelineStep::Submitting,
                at: now,
            }],
            outcome: None,
            failure_reason: None,
            started_at: now,
            finished_at: None,
        }
    }

    /// Records progress to the next step.
    pub fn advance(&mut self, step: PipelineStep) -> Result<(), ValidationError> {
        self.step = self.step.transition_to(step)?;
        let now = Timestamp::now();
        self.steps.push(StepRecord { step, at: now });
        if self.step.is_terminal() {
            self.finished_at = Some(now);
        }
        Ok(())
    }

    /// Moves to `Failed` from whichever step is current.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), ValidationError> {
        self.failure_reason = Some(reason.into());
        self.advance(PipelineStep::Failed)
    }

    pub fn is_finished(&self) -> bool {
        self.step.is_terminal()
    }

    pub fn attempts(&self) -> u32 {
        self.outcome.as_ref().map_or(0, ClaimOutcome::attempts)
    }

    pub fn receipt(&self) -> Option<&ClaimReceipt> {
        match &self.outcome {
            Some(ClaimOutcome::Confirmed { receipt, .. }) => Some(receipt),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_records_every_step() {
        let mut run = PipelineRun::start(ConversationId::new());
        for step in [
            PipelineStep::Submitted,
            PipelineStep::StateUpdated,
            PipelineStep::Notified,
            PipelineStep::Scheduled,
        ] {
            run.advance(step).unwrap();
        }
        assert!(run.is_finished());
        assert_eq!(run.steps.len(), 5);
        assert!(run.finished_at.is_some());
    }

    #[test]
    fn cannot_skip_steps() {
        let mut run = PipelineRun::start(ConversationId::new());
        assert!(run.advance(PipelineStep::Scheduled).is_err());
        assert_eq!(run.step, PipelineStep::Submitting);
    }

    #[test]
    fn fail_from_any_open_step() {
        let mut run = PipelineRun::start(ConversationId::new());
        run.advance(PipelineStep::Submitted).unwrap();
        run.fail("dispatcher down").unwrap();
        assert_eq!(run.step, PipelineStep::Failed);
        assert_eq!(run.failure_reason.as_deref(), Some("dispatcher down"));
        assert!(run.fail("again").is_err());
    }

    #[test]
    fn outcome_reports_attempts() {
        let outcome = ClaimOutcome::Failed {
            error: "HTTP 400".into(),
            attempts: 1,
        };
        assert_eq!(outcome.attempts(), 1);
        assert!(!outcome.is_confirmed());
    }
}
