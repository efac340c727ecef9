//! Care Journey - Hospital admission claim dialogue engine
//!
//! Guides an insured customer through a staged conversation that ends in a
//! cashless claim intimation, then keeps them informed with timed follow-ups.
//!
//! - `domain` - Stage graph, data extraction, claim and scheduling types
//! - `ports` - Contracts for stores and external collaborators
//! - `application` - Turn orchestration, claim pipeline, scheduling agent
//! - `adapters` - HTTP API, in-memory stores, external clients
//! - `engine` - Wiring of the above into a running orchestrator

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod engine;
pub mod ports;
