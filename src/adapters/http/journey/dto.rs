//! HTTP DTOs for journey endpoints.

use serde::{Deserialize, Serialize};

use crate::application::TurnOutcome;
use crate::domain::claims::{ClaimOutcome, PipelineRun, PipelineStep, StepRecord};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::journey::{
    CollectedData, ConversationState, Intent, Journey, JourneyStatus, Outcome, StageId, TranscriptEntry,
};
use crate::domain::scheduling::{JobStatus, ScheduledMessageJob};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start a journey, replacing any active one.
#[derive(Debug, Clone, Deserialize)]
pub struct StartJourneyRequest {
    pub customer_id: String,
    #[serde(default)]
    pub intent: Option<Intent>,
}

/// Inbound customer message.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub customer_id: String,
    pub text: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct JourneyResponse {
    pub customer_id: String,
    pub conversation_id: String,
    pub intent: Intent,
    pub status: JourneyStatus,
    pub started_at: String,
    pub updated_at: String,
}

impl From<Journey> for JourneyResponse {
    fn from(journey: Journey) -> Self {
        Self {
            customer_id: journey.customer_id.to_string(),
            conversation_id: journey.conversation_id.to_string(),
            intent: journey.intent,
            status: journey.status,
            started_at: journey.started_at.as_datetime().to_rfc3339(),
            updated_at: journey.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Result of one dialogue turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_stage: Option<StageId>,
    pub stage: StageId,
    pub outcome: Outcome,
    pub reply: String,
    /// True when this turn handed the claim to the background pipeline.
    pub claim_started: bool,
}

impl From<&TurnOutcome> for TurnResponse {
    fn from(turn: &TurnOutcome) -> Self {
        Self {
            conversation_id: turn.conversation_id.to_string(),
            previous_stage: turn.previous_stage,
            stage: turn.stage,
            outcome: turn.outcome,
            reply: turn.reply.clone(),
            claim_started: turn.claim.is_some(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub customer_id: String,
    pub intent: Intent,
    pub stage: Option<StageId>,
    pub collected: CollectedData,
    pub stage_history: Vec<StageId>,
    pub transcript: Vec<TranscriptEntry>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ConversationState> for ConversationResponse {
    fn from(state: ConversationState) -> Self {
        Self {
            conversation_id: state.conversation_id.to_string(),
            customer_id: state.customer_id.to_string(),
            intent: state.intent,
            stage: state.current_stage,
            collected: state.collected,
            stage_history: state.stage_history.into_iter().map(|visit| visit.stage).collect(),
            transcript: state.transcript,
            created_at: state.created_at.as_datetime().to_rfc3339(),
            updated_at: state.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobResponse {
    pub id: String,
    pub sequence: usize,
    pub text: String,
    pub status: JobStatus,
    pub scheduled_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ScheduledMessageJob> for JobResponse {
    fn from(job: ScheduledMessageJob) -> Self {
        Self {
            id: job.id.to_string(),
            sequence: job.sequence,
            text: job.text,
            status: job.status,
            scheduled_at: job.scheduled_at.as_datetime().to_rfc3339(),
            sent_text: job.sent_text,
            error: job.error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListResponse {
    pub items: Vec<JobResponse>,
    pub total: usize,
}

impl From<Vec<ScheduledMessageJob>> for JobListResponse {
    fn from(jobs: Vec<ScheduledMessageJob>) -> Self {
        let items: Vec<JobResponse> = jobs.into_iter().map(Into::into).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimRunResponse {
    pub run_id: String,
    pub step: PipelineStep,
    pub steps: Vec<StepRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ClaimOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

impl From<PipelineRun> for ClaimRunResponse {
    fn from(run: PipelineRun) -> Self {
        Self {
            run_id: run.id.to_string(),
            step: run.step,
            steps: run.steps,
            outcome: run.outcome,
            failure_reason: run.failure_reason,
            started_at: run.started_at.as_datetime().to_rfc3339(),
            finished_at: run.finished_at.map(|at| at.as_datetime().to_rfc3339()),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
            details: None,
        }
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(error: &DomainError) -> Self {
        let details = (!error.details.is_empty())
            .then(|| serde_json::to_value(&error.details).ok())
            .flatten();
        Self {
            code: error.code.to_string(),
            message: error.message.clone(),
            details,
        }
    }
}
