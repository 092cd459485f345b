//! Completion gateway port
//!
//! Defines the interface for requesting text from the AI completion
//! endpoint. The API key travels with every call; adapters hold no
//! credentials of their own.

use async_trait::async_trait;
use quiz_domain::ApiKey;
use thiserror::Error;

/// Errors that can occur during a completion call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The key was rejected (HTTP 401/403) or none was supplied
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Timeout, refused connection, or a body that could not be read
    #[error("Network error: {0}")]
    Network(String),

    #[error("Service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    /// A success status without usable completion text
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::Auth(_))
    }
}

/// Result of checking a key against the completion endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Valid,
    Invalid,
    /// The endpoint could not be reached, so the key is unverified
    NetworkError,
}

impl KeyStatus {
    /// Map the outcome of a check completion to a key status.
    ///
    /// A success status with an odd body still proves the key was accepted.
    pub fn from_check(result: &Result<String, GatewayError>) -> Self {
        match result {
            Ok(_) | Err(GatewayError::MalformedResponse(_)) => KeyStatus::Valid,
            Err(GatewayError::Auth(_)) => KeyStatus::Invalid,
            Err(GatewayError::Network(_)) | Err(GatewayError::Service { .. }) => {
                KeyStatus::NetworkError
            }
        }
    }
}

/// System prompt of the key check
pub const KEY_PROBE_SYSTEM: &str = "You are a connectivity check.";
/// User prompt of the key check
pub const KEY_PROBE_PROMPT: &str = "Reply with the single word 'ok'.";

/// Gateway for the completion endpoint
///
/// This port defines how the application layer talks to the AI service.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Send a system and user prompt, returning the completion text.
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        key: &ApiKey,
    ) -> Result<String, GatewayError>;

    /// Check whether `key` is accepted by the endpoint.
    ///
    /// The default sends a minimal check completion; adapters may override it
    /// to use a shorter timeout.
    async fn validate_key(&self, key: &ApiKey) -> KeyStatus {
        let result = self.complete(KEY_PROBE_SYSTEM, KEY_PROBE_PROMPT, key).await;
        KeyStatus::from_check(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_status_from_check() {
        assert_eq!(KeyStatus::from_check(&Ok("ok".into())), KeyStatus::Valid);
        assert_eq!(
            KeyStatus::from_check(&Err(GatewayError::MalformedResponse("no choices".into()))),
            KeyStatus::Valid
        );
        assert_eq!(
            KeyStatus::from_check(&Err(GatewayError::Auth("401".into()))),
            KeyStatus::Invalid
        );
        assert_eq!(
            KeyStatus::from_check(&Err(GatewayError::Network("timeout".into()))),
            KeyStatus::NetworkError
        );
        assert_eq!(
            KeyStatus::from_check(&Err(GatewayError::Service {
                status: 503,
                message: "overloaded".into()
            })),
            KeyStatus::NetworkError
        );
    }

    #[test]
    fn test_error_display() {
        let err = GatewayError::Service {
            status: 429,
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "Service error (HTTP 429): rate limited");
        assert!(GatewayError::Auth("bad".into()).is_auth());
    }
}
