//! Quiz behavior configuration from TOML (`[quiz]` section)

use quiz_application::QuizBehavior;
use quiz_domain::{
    ConfigIssue, ConfigIssueCode, GenerationMode, MAX_QUESTIONS_PER_REQUEST, SavePolicy,
};
use serde::{Deserialize, Serialize};

/// Raw quiz configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQuizConfig {
    /// Questions per quiz when none is given
    pub default_count: usize,
    /// "reuse" or "generate"
    pub default_mode: String,
    /// Weight random source picks by importance
    pub use_priorities: bool,
    /// Questions a finished quiz requeues: "all", "wrong" or "none"
    pub save_policy: String,
}

impl Default for FileQuizConfig {
    fn default() -> Self {
        Self {
            default_count: 5,
            default_mode: GenerationMode::Reuse.to_string(),
            use_priorities: true,
            save_policy: SavePolicy::Wrong.to_string(),
        }
    }
}

impl FileQuizConfig {
    /// Parse `default_mode`, falling back to reuse with an issue.
    pub fn parse_mode(&self) -> (GenerationMode, Option<ConfigIssue>) {
        match self.default_mode.parse::<GenerationMode>() {
            Ok(mode) => (mode, None),
            Err(_) => (
                GenerationMode::Reuse,
                Some(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "quiz.default_mode".to_string(),
                        value: self.default_mode.clone(),
                        valid_values: vec!["reuse".to_string(), "generate".to_string()],
                    },
                    format!(
                        "quiz.default_mode: unknown value '{}', falling back to 'reuse'",
                        self.default_mode
                    ),
                )),
            ),
        }
    }

    /// Parse `save_policy`, falling back to wrong answers with an issue.
    pub fn parse_save_policy(&self) -> (SavePolicy, Option<ConfigIssue>) {
        match self.save_policy.parse::<SavePolicy>() {
            Ok(policy) => (policy, None),
            Err(_) => (
                SavePolicy::Wrong,
                Some(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "quiz.save_policy".to_string(),
                        value: self.save_policy.clone(),
                        valid_values: vec![
                            "all".to_string(),
                            "wrong".to_string(),
                            "none".to_string(),
                        ],
                    },
                    format!(
                        "quiz.save_policy: unknown value '{}', falling back to 'wrong'",
                        self.save_policy
                    ),
                )),
            ),
        }
    }

    /// Issue for a `default_count` outside `1..=MAX_QUESTIONS_PER_REQUEST`.
    pub fn count_issue(&self) -> Option<ConfigIssue> {
        (self.default_count == 0 || self.default_count > MAX_QUESTIONS_PER_REQUEST).then(|| {
            ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "quiz.default_count".to_string(),
                },
                format!(
                    "quiz.default_count: {} is outside 1..={}, clamping",
                    self.default_count, MAX_QUESTIONS_PER_REQUEST
                ),
            )
        })
    }

    pub fn to_behavior(&self) -> QuizBehavior {
        QuizBehavior::default()
            .with_default_count(self.default_count)
            .with_default_mode(self.parse_mode().0)
            .with_priorities(self.use_priorities)
            .with_save_policy(self.parse_save_policy().0)
    }
}
