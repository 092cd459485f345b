//! Configuration file loading for ai-quiz
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. `AI_QUIZ_*` environment variables
//! 3. Project root: `./quiz.toml` or `./.quiz.toml`
//! 4. Global: `$XDG_CONFIG_HOME/ai-quiz/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileOutputConfig, FileProviderConfig, FileQuizConfig, FileStorageConfig,
};
pub use loader::ConfigLoader;
