//! Quiz repository port
//!
//! Persistence for the library (topics, sources, stored questions) and the
//! API key. Every mutation either fully succeeds or leaves stored data as it
//! was.

use async_trait::async_trait;
use quiz_domain::{ApiKey, DomainError, Question, SourceDraft, StoredQuestion, Topic};
use thiserror::Error;

/// Errors that can occur while reading or writing quiz data
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    Serialization(String),

    /// The requested change violates a library rule (unknown topic, duplicate name, ...)
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RepositoryError {
    /// Domain errors describe the request; everything else is a storage fault.
    pub fn is_storage_failure(&self) -> bool {
        !matches!(self, RepositoryError::Domain(_))
    }
}

/// Storage for topics, sources, questions and the API key
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn list_topics(&self) -> Result<Vec<Topic>, RepositoryError>;

    /// A single topic with its sources; `TopicNotFound` when missing
    async fn topic(&self, name: &str) -> Result<Topic, RepositoryError>;

    async fn add_topic(&self, name: &str) -> Result<(), RepositoryError>;

    async fn rename_topic(&self, name: &str, new_name: &str) -> Result<(), RepositoryError>;

    /// Remove a topic and everything under it
    async fn remove_topic(&self, name: &str) -> Result<(), RepositoryError>;

    async fn add_source(&self, topic: &str, draft: SourceDraft) -> Result<(), RepositoryError>;

    async fn update_source(
        &self,
        topic: &str,
        source: &str,
        draft: SourceDraft,
    ) -> Result<(), RepositoryError>;

    /// Remove a source and its questions
    async fn remove_source(&self, topic: &str, source: &str) -> Result<(), RepositoryError>;

    async fn get_questions(
        &self,
        topic: &str,
        source: &str,
    ) -> Result<Vec<StoredQuestion>, RepositoryError>;

    /// Store questions, skipping stems already present. Returns what was inserted.
    async fn add_questions(
        &self,
        topic: &str,
        source: &str,
        questions: Vec<Question>,
    ) -> Result<Vec<Question>, RepositoryError>;

    async fn remove_question(
        &self,
        topic: &str,
        source: &str,
        index: usize,
    ) -> Result<(), RepositoryError>;

    /// Bump the served counter of the given questions
    async fn mark_served(
        &self,
        topic: &str,
        source: &str,
        questions: &[Question],
    ) -> Result<(), RepositoryError>;

    /// Reset the served counter of the given questions so they are reused
    /// first, re-adding any that are no longer stored. Returns how many
    /// records were queued.
    async fn requeue_questions(
        &self,
        topic: &str,
        source: &str,
        questions: &[Question],
    ) -> Result<usize, RepositoryError>;

    async fn get_api_key(&self) -> Result<Option<ApiKey>, RepositoryError>;

    async fn set_api_key(&self, key: &ApiKey) -> Result<(), RepositoryError>;
}
