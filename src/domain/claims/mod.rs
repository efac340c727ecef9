//! Claim submission vocabulary: payload, retry policy and pipeline runs.

pub mod pipeline;
pub mod request;
pub mod retry;

pub use pipeline::{ClaimOutcome, PipelineRun, PipelineStep, StepRecord};
pub use request::{ClaimReceipt, ClaimRequest, PolicyholderProfile};
pub use retry::{Backoff, RetryPolicy};
