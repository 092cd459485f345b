//! TUI event types
//!
//! Events that spawned tasks send back to the [`TuiApp`](super::TuiApp)
//! loop, and the side effects the loop performs on behalf of the state.

use quiz_application::{GenerateError, GenerationOutput};
use quiz_domain::{ApiKey, GenerationRequest, GenerationState, Question, SkippedBlock};

/// Progress and outcome of a spawned generation task
#[derive(Debug, Clone)]
pub enum GenerationEvent {
    State(GenerationState),
    Skipped(SkippedBlock),
    Finished(Result<GenerationOutput, GenerateError>),
}

/// Work the state asks the loop to do after handling a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Spawn a generation task
    Generate(GenerationRequest),
    /// Spawn a key check; a valid key is persisted when the result arrives
    ValidateKey(ApiKey),
    /// Re-read the topic list from storage
    Reload,
    /// Put questions from a finished quiz back at the front of the queue
    Requeue {
        topic: String,
        source: String,
        questions: Vec<Question>,
    },
}
