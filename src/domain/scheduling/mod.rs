//! Deferred follow-up messages.

pub mod job;
pub mod template;

pub use job::{plan_jobs, JobStatus, MessageSpec, ScheduledMessageJob};
pub use template::{render, unresolved_placeholders};
