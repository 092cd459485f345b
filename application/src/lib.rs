//! Application layer for ai-quiz
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::QuizBehavior;
pub use ports::{
    completion_gateway::{CompletionGateway, GatewayError, KeyStatus},
    progress::{GenerationProgress, NoProgress},
    quiz_repository::{QuizRepository, RepositoryError},
};
pub use use_cases::generate_questions::{GenerateError, GenerateQuestionsUseCase, GenerationOutput};
pub use use_cases::validate_api_key::{KeyValidationEvent, ValidateApiKeyUseCase};
