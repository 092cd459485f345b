//! Completion provider configuration from TOML (`[provider]` section)

use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Timeout for question generation requests.
    pub request_timeout_seconds: u64,
    /// Timeout for the API key check.
    pub validation_timeout_seconds: u64,
    /// Environment variable consulted when no key is stored (default: "GROQ_API_KEY").
    pub api_key_env: String,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama3-70b-8192".to_string(),
            temperature: 0.7,
            request_timeout_seconds: 60,
            validation_timeout_seconds: 10,
            api_key_env: "GROQ_API_KEY".to_string(),
        }
    }
}
