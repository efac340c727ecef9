//! HTTP adapter for journey, conversation and follow-up endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ClaimRunResponse, ConversationResponse, ErrorResponse, JobListResponse, JobResponse, JourneyResponse,
    SendMessageRequest, StartJourneyRequest, TurnResponse,
};
pub use handlers::JourneyHandlers;
pub use routes::journey_routes;
