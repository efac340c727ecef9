//! Outbound messaging adapters.

mod console_dispatcher;
mod http_dispatcher;
mod in_memory_dispatcher;

pub use console_dispatcher::ConsoleDispatcher;
pub use http_dispatcher::HttpDispatcher;
pub use in_memory_dispatcher::{InMemoryDispatcher, SentMessage};
