//! Domain layer for ai-quiz
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Library
//!
//! Topics group sources. A source carries the reference text questions are
//! grounded on, an importance weight, and the questions generated from it.
//!
//! ## Prompt / Parse contract
//!
//! [`QuizPromptTemplate`] asks the completion endpoint for a fixed text
//! layout; [`parse_questions`] reads that layout back, tolerating the usual
//! markdown noise and skipping malformed blocks instead of failing the batch.

pub mod config;
pub mod core;
pub mod library;
pub mod prompt;
pub mod quiz;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::{api_key::ApiKey, error::DomainError};
pub use library::{
    DEFAULT_IMPORTANCE, Library, MAX_IMPORTANCE, Source, SourceDraft, Topic, pick_source,
};
pub use prompt::{MAX_QUESTIONS_PER_REQUEST, QuizPromptTemplate};
pub use quiz::{
    GenerationMode, GenerationRequest, GenerationState, OPTION_COUNT, OPTION_LABELS,
    ParseOutcome, ParseReport, Question, QuestionResult, QuizSession, SavePolicy, SkipReason,
    SkippedBlock, StoredQuestion, parse_questions,
};
