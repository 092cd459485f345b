//! Progress notification port
//!
//! Defines the interface for reporting progress while questions are
//! generated.

use quiz_domain::{GenerationState, SkippedBlock};

/// Callback for progress updates during question generation
///
/// Implementations live in the presentation layer (spinner, TUI status line).
pub trait GenerationProgress: Send + Sync {
    /// Called on every state transition
    fn on_state(&self, state: GenerationState);

    /// Called for each completion block that did not yield a question
    fn on_skipped(&self, _block: &SkippedBlock) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl GenerationProgress for NoProgress {
    fn on_state(&self, _state: GenerationState) {}
}
