//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `ConversationStore` - Conversation state keyed by conversation id
//! - `JourneyRepository` - Customer to active conversation mapping
//! - `ScheduledJobStore` - Status records of deferred messages
//! - `PipelineRunStore` - Claim pipeline run records
//!
//! ## External Collaborators
//!
//! - `TextGenerator` - Prose generation for replies and humanized follow-ups
//! - `DepartmentClassifier` / `CandidateSearch` - Hospital search
//! - `ClaimSubmitter` - Claims API
//! - `MessageDispatcher` - Outbound messaging gateway

mod candidate_search;
mod claim_submitter;
mod conversation_store;
mod department_classifier;
mod journey_repository;
mod message_dispatcher;
mod pipeline_run_store;
mod scheduled_job_store;
mod text_generator;

pub use candidate_search::{CandidateSearch, SearchError, SearchQuery};
pub use claim_submitter::{ClaimError, ClaimSubmitter};
pub use conversation_store::{ConversationStore, StateMutation};
pub use department_classifier::DepartmentClassifier;
pub use journey_repository::JourneyRepository;
pub use message_dispatcher::{DispatchError, MessageDispatcher};
pub use pipeline_run_store::PipelineRunStore;
pub use scheduled_job_store::ScheduledJobStore;
pub use text_generator::{ChatMessage, ChatRole, GenerationRequest, TextGenerationError, TextGenerator};
