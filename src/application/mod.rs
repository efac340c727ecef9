//! Application layer - turn orchestration and background work.
//!
//! - `Orchestrator` - Runs one customer turn end to end
//! - `SideEffectExecutor` - Hospital search and claim submission with retry
//! - `ClaimPipeline` - Detached claim saga: submit, record, notify, schedule
//! - `SchedulingAgent` - Cancellable timers for follow-up messages
//! - `ResponseBuilder` - Generated replies with template fallback

pub mod claim_pipeline;
pub mod orchestrator;
pub mod response_builder;
pub mod scheduler;
pub mod side_effects;

pub use claim_pipeline::{ClaimPipeline, FOLLOWUP_TEMPLATES};
pub use orchestrator::{Orchestrator, TurnError, TurnOutcome};
pub use response_builder::{ReplySanitizer, ResponseBuilder};
pub use scheduler::{SchedulingAgent, SchedulingError, Ticket};
pub use side_effects::SideEffectExecutor;
