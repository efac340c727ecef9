//! HTTP handlers for journey endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::application::{Orchestrator, TurnError};
use crate::domain::foundation::{ConversationId, CustomerId, DomainError, ErrorCode};

use super::dto::{
    ClaimRunResponse, ConversationResponse, ErrorResponse, JobListResponse, JourneyResponse, SendMessageRequest,
    StartJourneyRequest, TurnResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct JourneyHandlers {
    orchestrator: Arc<Orchestrator>,
}

impl JourneyHandlers {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/journeys - Start a journey, replacing the active one
pub async fn start_journey(
    State(handlers): State<JourneyHandlers>,
    Json(req): Json<StartJourneyRequest>,
) -> Response {
    let customer_id = match parse_customer(&req.customer_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .orchestrator
        .start_journey(&customer_id, req.intent.unwrap_or_default())
        .await
    {
        Ok((journey, _)) => (StatusCode::CREATED, Json(JourneyResponse::from(journey))).into_response(),
        Err(e) => handle_turn_error(e),
    }
}

/// GET /api/journeys/:customer_id - Active journey of a customer
pub async fn get_journey(State(handlers): State<JourneyHandlers>, Path(customer_id): Path<String>) -> Response {
    let customer_id = match parse_customer(&customer_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.orchestrator.active_journey(&customer_id).await {
        Ok(Some(journey)) => (StatusCode::OK, Json(JourneyResponse::from(journey))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Journey", customer_id.as_str())),
        )
            .into_response(),
        Err(e) => handle_domain_error(e),
    }
}

/// DELETE /api/journeys/:customer_id - Close the active journey
pub async fn close_journey(State(handlers): State<JourneyHandlers>, Path(customer_id): Path<String>) -> Response {
    let customer_id = match parse_customer(&customer_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.orchestrator.close_journey(&customer_id).await {
        Ok(journey) => (StatusCode::OK, Json(JourneyResponse::from(journey))).into_response(),
        Err(e) => handle_turn_error(e),
    }
}

/// POST /api/messages - Run one dialogue turn
pub async fn send_message(
    State(handlers): State<JourneyHandlers>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let customer_id = match parse_customer(&req.customer_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.orchestrator.handle_message(&customer_id, &req.text).await {
        // The claim pipeline keeps running after its handle is dropped.
        Ok(turn) => (StatusCode::OK, Json(TurnResponse::from(&turn))).into_response(),
        Err(e) => handle_turn_error(e),
    }
}

/// GET /api/conversations/:conversation_id
pub async fn get_conversation(
    State(handlers): State<JourneyHandlers>,
    Path(conversation_id): Path<String>,
) -> Response {
    let conversation_id = match parse_conversation(&conversation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.orchestrator.conversation(&conversation_id).await {
        Ok(state) => (StatusCode::OK, Json(ConversationResponse::from(state))).into_response(),
        Err(e) => handle_domain_error(e),
    }
}

/// GET /api/conversations/:conversation_id/jobs - Scheduled follow-ups
pub async fn list_jobs(State(handlers): State<JourneyHandlers>, Path(conversation_id): Path<String>) -> Response {
    let conversation_id = match parse_conversation(&conversation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.orchestrator.jobs(&conversation_id).await {
        Ok(jobs) => (StatusCode::OK, Json(JobListResponse::from(jobs))).into_response(),
        Err(e) => handle_domain_error(e),
    }
}

/// GET /api/conversations/:conversation_id/claim - Latest claim pipeline run
pub async fn get_claim(State(handlers): State<JourneyHandlers>, Path(conversation_id): Path<String>) -> Response {
    let conversation_id = match parse_conversation(&conversation_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.orchestrator.claim_pipeline(&conversation_id).await {
        Ok(Some(run)) => (StatusCode::OK, Json(ClaimRunResponse::from(run))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Claim run", &conversation_id.to_string())),
        )
            .into_response(),
        Err(e) => handle_domain_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn parse_customer(raw: &str) -> Result<CustomerId, Response> {
    CustomerId::new(raw).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(ErrorCode::ValidationFailed, e.to_string())),
        )
            .into_response()
    })
}

fn parse_conversation(raw: &str) -> Result<ConversationId, Response> {
    raw.parse::<ConversationId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid conversation ID")),
        )
            .into_response()
    })
}

pub(super) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::EmptyMessage | ErrorCode::UnresolvedPlaceholder => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::ConversationNotFound | ErrorCode::JourneyNotFound | ErrorCode::JobNotFound => {
            StatusCode::NOT_FOUND
        }
        ErrorCode::InvalidStateTransition | ErrorCode::AlreadyScheduled => StatusCode::CONFLICT,
        ErrorCode::TextGenerationFailed
        | ErrorCode::SearchFailed
        | ErrorCode::ClaimSubmissionFailed
        | ErrorCode::DispatchFailed => StatusCode::BAD_GATEWAY,
        ErrorCode::StorageError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn handle_domain_error(error: DomainError) -> Response {
    let status = status_for(error.code);
    if status.is_server_error() {
        error!(code = %error.code, error = %error, "Journey request failed");
    }
    (status, Json(ErrorResponse::from(&error))).into_response()
}

fn handle_turn_error(error: TurnError) -> Response {
    match error {
        TurnError::Domain(e) => handle_domain_error(e),
        other => (
            status_for(other.code()),
            Json(ErrorResponse::new(other.code(), other.to_string())),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_map_to_bad_request() {
        assert_eq!(status_for(ErrorCode::EmptyMessage), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::ValidationFailed), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn state_conflicts_map_to_conflict() {
        assert_eq!(status_for(ErrorCode::AlreadyScheduled), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::InvalidStateTransition), StatusCode::CONFLICT);
    }

    #[test]
    fn infrastructure_errors_map_to_server_error() {
        assert_eq!(status_for(ErrorCode::StorageError), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for(ErrorCode::SearchFailed), StatusCode::BAD_GATEWAY);
    }
}
