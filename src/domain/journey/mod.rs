//! Admission claim journey: stage graph, extraction rules and conversation state.

pub mod calendar;
pub mod collected;
pub mod engine;
pub mod extractor;
pub mod graph;
pub mod journey;
pub mod matcher;
pub mod prompts;
pub mod signals;
pub mod stage;
pub mod state;

pub use collected::{ClaimProgress, CollectedData, Field, FieldValue};
pub use engine::{rule_for, DecisionInput, DecisionRule};
pub use extractor::{extract, ExtractionContext};
pub use graph::{StageGraph, Transition};
pub use journey::{Journey, JourneyStatus};
pub use matcher::CandidateMatch;
pub use stage::{Intent, Outcome, SideEffect, Stage, StageId};
pub use state::{ConversationState, Speaker, StageVisit, TranscriptEntry};
