//! Generation request value objects

use crate::core::error::DomainError;
use crate::prompt::MAX_QUESTIONS_PER_REQUEST;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether stored questions may satisfy a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Serve never-served stored questions when enough exist, else ask the AI
    Generate,
    /// Serve the least-served stored questions first, generate the rest
    #[default]
    Reuse,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Generate => "generate",
            GenerationMode::Reuse => "reuse",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generate" | "new" | "fresh" => Ok(GenerationMode::Generate),
            "reuse" | "cached" => Ok(GenerationMode::Reuse),
            other => Err(DomainError::InvalidRequest(format!(
                "unknown mode '{}', expected 'reuse' or 'generate'",
                other
            ))),
        }
    }
}

/// A request for `count` questions about a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    /// `None` lets the use case pick a source from the topic
    pub source: Option<String>,
    pub count: usize,
    pub mode: GenerationMode,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>, count: usize) -> Self {
        Self {
            topic: topic.into(),
            source: None,
            count,
            mode: GenerationMode::default(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Check the parts of the request that need no stored data.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.topic.trim().is_empty() {
            return Err(DomainError::InvalidRequest("topic is empty".into()));
        }
        if let Some(source) = &self.source
            && source.trim().is_empty()
        {
            return Err(DomainError::InvalidRequest("source name is empty".into()));
        }
        if self.count == 0 || self.count > MAX_QUESTIONS_PER_REQUEST {
            return Err(DomainError::InvalidRequest(format!(
                "question count must be between 1 and {}, got {}",
                MAX_QUESTIONS_PER_REQUEST, self.count
            )));
        }
        Ok(())
    }
}

/// Lifecycle of a single generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    /// Waiting on the completion endpoint
    Requesting,
    Parsing,
    Delivered,
    Failed,
}

impl GenerationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationState::Delivered | GenerationState::Failed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GenerationState::Idle => "idle",
            GenerationState::Requesting => "requesting questions",
            GenerationState::Parsing => "parsing response",
            GenerationState::Delivered => "delivered",
            GenerationState::Failed => "failed",
        }
    }
}
