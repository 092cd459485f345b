//! Question record entities

use crate::core::error::DomainError;
use crate::core::string::{collapse_whitespace, normalize_stem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of options every question carries.
pub const OPTION_COUNT: usize = 4;

/// Option labels in display order.
pub const OPTION_LABELS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

/// A multiple-choice question (Value Object)
///
/// Always holds exactly four non-empty options and a correct index in
/// `0..4`; the stem is non-empty. Deserialization goes through the same
/// validation as [`Question::try_new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuestion")]
pub struct Question {
    stem: String,
    options: [String; OPTION_COUNT],
    correct: usize,
}

#[derive(Deserialize)]
struct RawQuestion {
    stem: String,
    options: Vec<String>,
    correct: usize,
}

impl TryFrom<RawQuestion> for Question {
    type Error = DomainError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        Question::try_new(raw.stem, raw.options, raw.correct)
    }
}

impl Question {
    /// Validate and build a question. Whitespace in the stem and options is
    /// collapsed.
    pub fn try_new(
        stem: impl Into<String>,
        options: Vec<String>,
        correct: usize,
    ) -> Result<Self, DomainError> {
        let stem = collapse_whitespace(&stem.into());
        if stem.is_empty() {
            return Err(DomainError::InvalidQuestion("stem is empty".into()));
        }

        let options: [String; OPTION_COUNT] = options
            .into_iter()
            .map(|o| collapse_whitespace(&o))
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|v: Vec<String>| {
                DomainError::InvalidQuestion(format!(
                    "expected {} options, got {}",
                    OPTION_COUNT,
                    v.len()
                ))
            })?;

        if let Some(pos) = options.iter().position(|o| o.is_empty()) {
            return Err(DomainError::InvalidQuestion(format!(
                "option {} is empty",
                OPTION_LABELS[pos]
            )));
        }

        if correct >= OPTION_COUNT {
            return Err(DomainError::InvalidQuestion(format!(
                "correct index {} out of range",
                correct
            )));
        }

        Ok(Self {
            stem,
            options,
            correct,
        })
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    /// 0-based index of the correct option
    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn correct_label(&self) -> char {
        OPTION_LABELS[self.correct]
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct]
    }

    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct
    }

    /// Key used to detect duplicate stems within a source.
    pub fn normalized_stem(&self) -> String {
        normalize_stem(&self.stem)
    }
}

/// Map an option label (`A`-`D`, `a`-`d`, or `1`-`4`) to a 0-based index.
pub fn label_to_index(label: char) -> Option<usize> {
    match label {
        'A'..='D' => Some(label as usize - 'A' as usize),
        'a'..='d' => Some(label as usize - 'a' as usize),
        '1'..='4' => Some(label as usize - '1' as usize),
        _ => None,
    }
}

/// A question as kept by the repository (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuestion {
    #[serde(flatten)]
    pub question: Question,
    /// How many times this record has been delivered to a quiz
    #[serde(default)]
    pub served: u32,
    pub created_at: DateTime<Utc>,
}

impl StoredQuestion {
    pub fn new(question: Question) -> Self {
        Self {
            question,
            served: 0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec![
            "Nucleus".to_string(),
            "Ribosome".to_string(),
            "Golgi".to_string(),
            "Lysosome".to_string(),
        ]
    }

    #[test]
    fn test_question_creation() {
        let q = Question::try_new("Which organelle  holds DNA?", options(), 0).unwrap();
        assert_eq!(q.stem(), "Which organelle holds DNA?");
        assert_eq!(q.correct_label(), 'A');
        assert_eq!(q.correct_option(), "Nucleus");
        assert!(q.is_correct(0));
        assert!(!q.is_correct(1));
    }

    #[test]
    fn test_empty_stem_rejected() {
        assert!(Question::try_new("   ", options(), 0).is_err());
    }

    #[test]
    fn test_wrong_option_count_rejected() {
        let mut three = options();
        three.pop();
        assert!(Question::try_new("Q?", three, 0).is_err());

        let mut five = options();
        five.push("Vacuole".to_string());
        assert!(Question::try_new("Q?", five, 0).is_err());
    }

    #[test]
    fn test_blank_option_rejected() {
        let mut opts = options();
        opts[2] = "  ".to_string();
        let err = Question::try_new("Q?", opts, 0).unwrap_err();
        assert!(err.to_string().contains("option C"));
    }

    #[test]
    fn test_correct_out_of_range_rejected() {
        assert!(Question::try_new("Q?", options(), 4).is_err());
    }

    #[test]
    fn test_label_to_index() {
        assert_eq!(label_to_index('A'), Some(0));
        assert_eq!(label_to_index('d'), Some(3));
        assert_eq!(label_to_index('3'), Some(2));
        assert_eq!(label_to_index('E'), None);
        assert_eq!(label_to_index('5'), None);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok = r#"{"stem":"Q?","options":["a","b","c","d"],"correct":1}"#;
        assert!(serde_json::from_str::<Question>(ok).is_ok());

        let bad = r#"{"stem":"Q?","options":["a","b","c"],"correct":1}"#;
        assert!(serde_json::from_str::<Question>(bad).is_err());
    }

    #[test]
    fn test_stored_question_flattens() {
        let stored = StoredQuestion::new(Question::try_new("Q?", options(), 2).unwrap());
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["stem"], "Q?");
        assert_eq!(json["correct"], 2);
        assert_eq!(json["served"], 0);

        let back: StoredQuestion = serde_json::from_value(json).unwrap();
        assert_eq!(back, stored);
    }
}
