//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Text generation (OpenAI-compatible, mock)
//! - `claims` - Claims intimation API client and mock
//! - `http` - REST API over the orchestrator
//! - `messaging` - Outbound message dispatch (gateway, console, in-memory)
//! - `search` - Department classification and hospital catalog
//! - `storage` - In-memory conversation, journey, job and pipeline stores

pub mod ai;
pub mod claims;
pub mod http;
pub mod messaging;
pub mod search;
pub mod storage;
