//! Chat completion adapter
//!
//! Implements [`CompletionGateway`](quiz_application::CompletionGateway) over
//! an OpenAI-compatible `/chat/completions` endpoint (Groq by default).

pub mod gateway;
pub mod protocol;

pub use gateway::{ChatCompletionConfig, ChatCompletionGateway};
