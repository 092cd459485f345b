//! API key value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Credential for the completion endpoint (Value Object)
///
/// Never printed in full: `Debug` and [`ApiKey::masked`] only reveal the
/// last four characters.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a key, trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidApiKey("API key cannot be empty".into()));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidApiKey(
                "API key cannot contain whitespace".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The raw secret, for building the bearer header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form suitable for display, e.g. `****abcd`.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat((chars.len() - 4).min(12)), tail)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&self.masked()).finish()
    }
}

impl TryFrom<String> for ApiKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ApiKey::new(value)
    }
}

impl From<ApiKey> for String {
    fn from(key: ApiKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims() {
        let key = ApiKey::new("  gsk_secret123  ").unwrap();
        assert_eq!(key.expose(), "gsk_secret123");
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(ApiKey::new("").is_err());
        assert!(ApiKey::new("   ").is_err());
        assert!(ApiKey::new("abc def").is_err());
    }

    #[test]
    fn test_debug_is_masked() {
        let key = ApiKey::new("gsk_supersecretvalue").unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains("supersecret"));
        assert!(debug.contains("alue"));
    }

    #[test]
    fn test_short_key_fully_masked() {
        assert_eq!(ApiKey::new("abc").unwrap().masked(), "***");
    }

    #[test]
    fn test_serde_transparent() {
        let key: ApiKey = serde_json::from_str("\"gsk_123456\"").unwrap();
        assert_eq!(key.expose(), "gsk_123456");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"gsk_123456\"");
        assert!(serde_json::from_str::<ApiKey>("\"  \"").is_err());
    }
}
