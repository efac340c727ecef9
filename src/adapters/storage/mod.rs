//! In-memory storage adapters.
//!
//! State is process-local and lost on restart.

mod in_memory_conversation_store;
mod in_memory_job_store;
mod in_memory_journey_repository;
mod in_memory_pipeline_run_store;

pub use in_memory_conversation_store::InMemoryConversationStore;
pub use in_memory_job_store::InMemoryJobStore;
pub use in_memory_journey_repository::InMemoryJourneyRepository;
pub use in_memory_pipeline_run_store::InMemoryPipelineRunStore;
