//! HTTP adapters - REST API over the orchestrator.
//!
//! - `GET /health` - Liveness probe
//! - `/api/...` - Journey, message, conversation and follow-up endpoints

pub mod journey;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::Orchestrator;

pub use journey::{journey_routes, JourneyHandlers};

/// Builds the full application router.
pub fn api_router(orchestrator: Arc<Orchestrator>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", journey_routes(JourneyHandlers::new(orchestrator)))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": env!("CARGO_PKG_NAME") }))
}
