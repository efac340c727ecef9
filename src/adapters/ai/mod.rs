//! Text generation adapters.
//!
//! - `OpenAITextGenerator` - OpenAI-compatible chat completions over HTTP
//! - `MockTextGenerator` - Scripted responses for tests and offline runs

mod mock_text_generator;
mod openai_text_generator;

pub use mock_text_generator::MockTextGenerator;
pub use openai_text_generator::{OpenAIConfig, OpenAITextGenerator};
