//! HTTP routes for journey endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    close_journey, get_claim, get_conversation, get_journey, list_jobs, send_message, start_journey,
    JourneyHandlers,
};

/// Creates the journey router with all endpoints.
pub fn journey_routes(handlers: JourneyHandlers) -> Router {
    Router::new()
        .route("/journeys", post(start_journey))
        .route("/journeys/:customer_id", get(get_journey).delete(close_journey))
        .route("/messages", post(send_message))
        .route("/conversations/:conversation_id", get(get_conversation))
        .route("/conversations/:conversation_id/jobs", get(list_jobs))
        .route("/conversations/:conversation_id/claim", get(get_claim))
        .with_state(handlers)
}
