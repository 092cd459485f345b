//! Prompt domain
//!
//! Templates for the question-generation request.

mod template;

pub use template::{MAX_QUESTIONS_PER_REQUEST, QuizPromptTemplate};
