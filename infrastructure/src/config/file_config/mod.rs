//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types by the
//! binary.

mod output;
mod provider;
mod quiz;
mod storage;

pub use output::FileOutputConfig;
pub use provider::FileProviderConfig;
pub use quiz::FileQuizConfig;
pub use storage::FileStorageConfig;

use quiz_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Completion endpoint settings
    pub provider: FileProviderConfig,
    /// Where the library and key are kept
    pub storage: FileStorageConfig,
    /// Quiz defaults
    pub quiz: FileQuizConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Empty provider fields
    /// 2. Timeouts and temperature ranges
    /// 3. Quiz defaults (count range, mode and save policy names)
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Empty provider fields
        for (field, value) in [
            ("provider.base_url", &self.provider.base_url),
            ("provider.model", &self.provider.model),
        ] {
            if value.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyValue {
                        field: field.to_string(),
                    },
                    format!("{} must not be empty", field),
                ));
            }
        }

        // 2. Ranges
        for (field, seconds) in [
            (
                "provider.request_timeout_seconds",
                self.provider.request_timeout_seconds,
            ),
            (
                "provider.validation_timeout_seconds",
                self.provider.validation_timeout_seconds,
            ),
        ] {
            if seconds == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::OutOfRange {
                        field: field.to_string(),
                    },
                    format!("{} must be at least 1", field),
                ));
            }
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "provider.temperature".to_string(),
                },
                format!(
                    "provider.temperature: {} is outside 0.0..=2.0 and may be rejected",
                    self.provider.temperature
                ),
            ));
        }

        // 3. Quiz defaults
        issues.extend(self.quiz.count_issue());
        issues.extend(self.quiz.parse_mode().1);
        issues.extend(self.quiz.parse_save_policy().1);

        issues
    }
}
