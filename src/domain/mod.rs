//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `hospital` - Departments and hospital records offered to customers
//! - `journey` - Stage graph, extraction rules and conversation state
//! - `claims` - Claim payloads, retry policy and pipeline runs
//! - `scheduling` - Deferred follow-up message jobs and templates

pub mod claims;
pub mod foundation;
pub mod hospital;
pub mod journey;
pub mod scheduling;
