//! Quiz behavior: defaults applied to generation requests.

use quiz_domain::{GenerationMode, MAX_QUESTIONS_PER_REQUEST, SavePolicy};

/// Behavior knobs for [`GenerateQuestionsUseCase`](crate::use_cases::generate_questions::GenerateQuestionsUseCase)
/// and the front ends that build requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizBehavior {
    /// Questions per quiz when the caller does not say
    pub default_count: usize,
    pub default_mode: GenerationMode,
    /// Weight random source picks by source importance
    pub use_priorities: bool,
    /// Which questions a finished quiz puts back in the review queue
    pub save_policy: SavePolicy,
}

impl Default for QuizBehavior {
    fn default() -> Self {
        Self {
            default_count: 5,
            default_mode: GenerationMode::Reuse,
            use_priorities: true,
            save_policy: SavePolicy::Wrong,
        }
    }
}

impl QuizBehavior {
    // ==================== Builder Methods ====================

    /// Counts outside `1..=MAX_QUESTIONS_PER_REQUEST` are clamped.
    pub fn with_default_count(mut self, count: usize) -> Self {
        self.default_count = count.clamp(1, MAX_QUESTIONS_PER_REQUEST);
        self
    }

    pub fn with_default_mode(mut self, mode: GenerationMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_priorities(mut self, enabled: bool) -> Self {
        self.use_priorities = enabled;
        self
    }

    pub fn with_save_policy(mut self, policy: SavePolicy) -> Self {
        self.save_policy = policy;
        self
    }
}
