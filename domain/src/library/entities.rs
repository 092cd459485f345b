//! Topic and source entities

use crate::core::error::DomainError;
use crate::core::string::{collapse_whitespace, name_key};
use crate::quiz::question::StoredQuestion;
use serde::{Deserialize, Serialize};

/// Highest importance a source can carry
pub const MAX_IMPORTANCE: u8 = 10;

/// Importance given to sources created without one
pub const DEFAULT_IMPORTANCE: u8 = 5;

/// User-supplied fields for creating or editing a [`Source`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDraft {
    pub name: String,
    pub content: String,
    pub link: Option<String>,
    pub importance: Option<u8>,
    pub comment: Option<String>,
}

impl SourceDraft {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = Some(importance);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Reference material inside a topic (Entity)
///
/// Owns the questions generated from it; deleting the source deletes them.
/// Loading merges stored questions whose normalized stems collide, keeping
/// the first record and the highest served count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SourceRecord")]
pub struct Source {
    name: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    importance: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    pub(crate) questions: Vec<StoredQuestion>,
}

/// On-disk shape of a [`Source`]
#[derive(Deserialize)]
struct SourceRecord {
    name: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default = "default_importance")]
    importance: u8,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    questions: Vec<StoredQuestion>,
}

impl From<SourceRecord> for Source {
    fn from(record: SourceRecord) -> Self {
        let mut questions: Vec<StoredQuestion> = Vec::with_capacity(record.questions.len());
        for stored in record.questions {
            let stem = stored.question.normalized_stem();
            match questions
                .iter_mut()
                .find(|kept| kept.question.normalized_stem() == stem)
            {
                Some(kept) => kept.served = kept.served.max(stored.served),
                None => questions.push(stored),
            }
        }

        Self {
            name: record.name,
            content: record.content,
            link: record.link,
            importance: record.importance,
            comment: record.comment,
            questions,
        }
    }
}

fn default_importance() -> u8 {
    DEFAULT_IMPORTANCE
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Source {
    /// Build a source from a draft. The name must be non-blank; importance
    /// is clamped to `0..=10`.
    pub fn new(draft: SourceDraft) -> Result<Self, DomainError> {
        let name = collapse_whitespace(&draft.name);
        if name.is_empty() {
            return Err(DomainError::InvalidSource("source name is empty".into()));
        }
        Ok(Self {
            name,
            content: draft.content.trim().to_string(),
            link: non_blank(draft.link),
            importance: draft
                .importance
                .unwrap_or(DEFAULT_IMPORTANCE)
                .min(MAX_IMPORTANCE),
            comment: non_blank(draft.comment),
            questions: Vec::new(),
        })
    }

    /// Replace the editable fields, keeping stored questions.
    pub(crate) fn apply(&mut self, draft: SourceDraft) -> Result<(), DomainError> {
        let questions = std::mem::take(&mut self.questions);
        *self = Source::new(draft)?;
        self.questions = questions;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn importance(&self) -> u8 {
        self.importance.min(MAX_IMPORTANCE)
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn questions(&self) -> &[StoredQuestion] {
        &self.questions
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        name_key(&self.name) == name_key(name)
    }
}

/// A named subject area grouping sources (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    name: String,
    #[serde(default)]
    pub(crate) sources: Vec<Source>,
}

impl Topic {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = collapse_whitespace(&name.into());
        if name.is_empty() {
            return Err(DomainError::InvalidTopic("topic name is empty".into()));
        }
        Ok(Self {
            name,
            sources: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.matches(name))
    }

    pub(crate) fn source_mut(&mut self, name: &str) -> Option<&mut Source> {
        self.sources.iter_mut().find(|s| s.matches(name))
    }

    /// Total number of stored questions across all sources.
    pub fn question_count(&self) -> usize {
        self.sources.iter().map(|s| s.questions.len()).sum()
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        name_key(&self.name) == name_key(name)
    }
}
