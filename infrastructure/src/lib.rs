//! Infrastructure layer for ai-quiz
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod chat;
pub mod config;
pub mod storage;

// Re-export commonly used types
pub use chat::{ChatCompletionConfig, ChatCompletionGateway};
pub use config::{
    ConfigLoader, FileConfig, FileOutputConfig, FileProviderConfig, FileQuizConfig,
    FileStorageConfig,
};
pub use storage::{API_KEY_FILE, JsonQuizRepository, LIBRARY_FILE};
