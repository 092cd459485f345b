//! Library aggregate: every topic, source and stored question.

use super::entities::{Source, SourceDraft, Topic};
use crate::core::error::DomainError;
use crate::quiz::question::{Question, StoredQuestion};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Root of the quiz data (Aggregate)
///
/// All mutations go through here so that name uniqueness, cascade deletes
/// and stem deduplication hold no matter which adapter persists it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    topics: Vec<Topic>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn topic(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.matches(name))
    }

    fn topic_mut(&mut self, name: &str) -> Result<&mut Topic, DomainError> {
        self.topics
            .iter_mut()
            .find(|t| t.matches(name))
            .ok_or_else(|| DomainError::TopicNotFound(name.to_string()))
    }

    fn source_mut(&mut self, topic: &str, source: &str) -> Result<&mut Source, DomainError> {
        let topic = self.topic_mut(topic)?;
        let topic_name = topic.name().to_string();
        topic
            .source_mut(source)
            .ok_or_else(|| DomainError::SourceNotFound {
                topic: topic_name,
                source_name: source.to_string(),
            })
    }

    /// Look up a source, distinguishing a missing topic from a missing source.
    pub fn source(&self, topic: &str, source: &str) -> Result<&Source, DomainError> {
        let topic = self
            .topic(topic)
            .ok_or_else(|| DomainError::TopicNotFound(topic.to_string()))?;
        topic.source(source).ok_or_else(|| DomainError::SourceNotFound {
            topic: topic.name().to_string(),
            source_name: source.to_string(),
        })
    }

    pub fn add_topic(&mut self, name: &str) -> Result<&Topic, DomainError> {
        let topic = Topic::new(name)?;
        if self.topic(topic.name()).is_some() {
            return Err(DomainError::DuplicateTopic(topic.name().to_string()));
        }
        self.topics.push(topic);
        Ok(&self.topics[self.topics.len() - 1])
    }

    pub fn rename_topic(&mut self, name: &str, new_name: &str) -> Result<(), DomainError> {
        let renamed = Topic::new(new_name)?;
        if let Some(existing) = self.topic(renamed.name())
            && !existing.matches(name)
        {
            return Err(DomainError::DuplicateTopic(renamed.name().to_string()));
        }
        let topic = self.topic_mut(name)?;
        let sources = std::mem::take(&mut topic.sources);
        *topic = renamed;
        topic.sources = sources;
        Ok(())
    }

    /// Remove a topic together with its sources and questions.
    pub fn remove_topic(&mut self, name: &str) -> Result<Topic, DomainError> {
        let pos = self
            .topics
            .iter()
            .position(|t| t.matches(name))
            .ok_or_else(|| DomainError::TopicNotFound(name.to_string()))?;
        Ok(self.topics.remove(pos))
    }

    pub fn add_source(&mut self, topic: &str, draft: SourceDraft) -> Result<(), DomainError> {
        let source = Source::new(draft)?;
        let topic = self.topic_mut(topic)?;
        if topic.source(source.name()).is_some() {
            return Err(DomainError::DuplicateSource {
                topic: topic.name().to_string(),
                source_name: source.name().to_string(),
            });
        }
        topic.sources.push(source);
        Ok(())
    }

    /// Edit a source in place. Its stored questions are kept.
    pub fn update_source(
        &mut self,
        topic: &str,
        source: &str,
        draft: SourceDraft,
    ) -> Result<(), DomainError> {
        let topic_ref = self.topic_mut(topic)?;
        if let Some(other) = topic_ref.source(&draft.name)
            && !other.matches(source)
        {
            return Err(DomainError::DuplicateSource {
                topic: topic_ref.name().to_string(),
                source_name: other.name().to_string(),
            });
        }
        self.source_mut(topic, source)?.apply(draft)
    }

    /// Remove a source together with its questions.
    pub fn remove_source(&mut self, topic: &str, source: &str) -> Result<Source, DomainError> {
        let topic_ref = self.topic_mut(topic)?;
        let pos = topic_ref
            .sources
            .iter()
            .position(|s| s.matches(source))
            .ok_or_else(|| DomainError::SourceNotFound {
                topic: topic_ref.name().to_string(),
                source_name: source.to_string(),
            })?;
        Ok(topic_ref.sources.remove(pos))
    }

    pub fn questions(&self, topic: &str, source: &str) -> Result<&[StoredQuestion], DomainError> {
        Ok(self.source(topic, source)?.questions())
    }

    /// Append questions to a source, skipping any whose normalized stem is
    /// already stored there or repeats within `questions`.
    ///
    /// Returns the questions that were actually inserted.
    pub fn add_questions(
        &mut self,
        topic: &str,
        source: &str,
        questions: Vec<Question>,
    ) -> Result<Vec<Question>, DomainError> {
        let source = self.source_mut(topic, source)?;
        let mut seen: HashSet<String> = source
            .questions
            .iter()
            .map(|q| q.question.normalized_stem())
            .collect();

        let mut inserted = Vec::new();
        for question in questions {
            if seen.insert(question.normalized_stem()) {
                source.questions.push(StoredQuestion::new(question.clone()));
                inserted.push(question);
            }
        }
        Ok(inserted)
    }

    pub fn remove_question(
        &mut self,
        topic: &str,
        source: &str,
        index: usize,
    ) -> Result<StoredQuestion, DomainError> {
        let source = self.source_mut(topic, source)?;
        if index >= source.questions.len() {
            return Err(DomainError::QuestionNotFound { index });
        }
        Ok(source.questions.remove(index))
    }

    /// Increment the served counter of every stored question whose
    /// normalized stem matches one of `questions`.
    pub fn mark_served(
        &mut self,
        topic: &str,
        source: &str,
        questions: &[Question],
    ) -> Result<(), DomainError> {
        let served: HashSet<String> = questions.iter().map(Question::normalized_stem).collect();
        let source = self.source_mut(topic, source)?;
        for stored in source.questions.iter_mut() {
            if served.contains(&stored.question.normalized_stem()) {
                stored.served = stored.served.saturating_add(1);
            }
        }
        Ok(())
    }

    /// Put `questions` back at the front of the review queue: matching
    /// stored records get their served counter reset to zero, the rest are
    /// appended as new records.
    ///
    /// Returns how many records were reset or added.
    pub fn requeue(
        &mut self,
        topic: &str,
        source: &str,
        questions: &[Question],
    ) -> Result<usize, DomainError> {
        let source = self.source_mut(topic, source)?;
        let mut queued = HashSet::new();
        for question in questions {
            let stem = question.normalized_stem();
            if !queued.insert(stem.clone()) {
                continue;
            }
            match source
                .questions
                .iter_mut()
                .find(|stored| stored.question.normalized_stem() == stem)
            {
                Some(stored) => stored.served = 0,
                None => source.questions.push(StoredQuestion::new(question.clone())),
            }
        }
        Ok(queued.len())
    }
}
