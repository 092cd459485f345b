//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("Source '{source_name}' not found in topic '{topic}'")]
    SourceNotFound { topic: String, source_name: String },

    #[error("Topic already exists: {0}")]
    DuplicateTopic(String),

    #[error("Source '{source_name}' already exists in topic '{topic}'")]
    DuplicateSource { topic: String, source_name: String },

    #[error("Question #{index} not found")]
    QuestionNotFound { index: usize },
}

impl DomainError {
    /// Check if this error was caused by bad caller input rather than
    /// missing records.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidRequest(_)
                | DomainError::InvalidQuestion(_)
                | DomainError::InvalidTopic(_)
                | DomainError::InvalidSource(_)
                | DomainError::InvalidApiKey(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_not_found_display() {
        let error = DomainError::SourceNotFound {
            topic: "Biology".to_string(),
            source_name: "Cell structure notes".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Source 'Cell structure notes' not found in topic 'Biology'"
        );
    }

    #[test]
    fn test_is_invalid_input_check() {
        assert!(DomainError::InvalidRequest("count".to_string()).is_invalid_input());
        assert!(DomainError::InvalidTopic("".to_string()).is_invalid_input());
        assert!(!DomainError::TopicNotFound("x".to_string()).is_invalid_input());
        assert!(!DomainError::QuestionNotFound { index: 3 }.is_invalid_input());
    }
}
