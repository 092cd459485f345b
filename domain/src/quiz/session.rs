//! Quiz session: answering delivered questions and scoring them

use super::question::Question;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome for one question once the quiz is over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub question: Question,
    /// Index the user picked, `None` if the quiz ended before it was answered
    pub chosen: Option<usize>,
    pub correct: bool,
}

/// Which answered questions go back to the front of the review queue
/// when a quiz ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavePolicy {
    All,
    /// Only questions answered wrong or left unanswered
    #[default]
    Wrong,
    None,
}

impl SavePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SavePolicy::All => "all",
            SavePolicy::Wrong => "wrong",
            SavePolicy::None => "none",
        }
    }

    /// Questions this policy keeps from a finished quiz, in quiz order
    pub fn select(&self, results: &[QuestionResult]) -> Vec<Question> {
        results
            .iter()
            .filter(|r| match self {
                SavePolicy::All => true,
                SavePolicy::Wrong => !r.correct,
                SavePolicy::None => false,
            })
            .map(|r| r.question.clone())
            .collect()
    }
}

impl fmt::Display for SavePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SavePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(SavePolicy::All),
            "wrong" => Ok(SavePolicy::Wrong),
            "none" | "off" => Ok(SavePolicy::None),
            other => Err(DomainError::InvalidRequest(format!(
                "unknown save policy '{}', expected 'all', 'wrong' or 'none'",
                other
            ))),
        }
    }
}

/// An in-progress quiz over a fixed list of questions
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: Vec<usize>,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            answers: Vec::new(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 0-based position of the question awaiting an answer
    pub fn position(&self) -> usize {
        self.answers.len()
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.answers.len())
    }

    /// Record the answer for the current question and move to the next one.
    ///
    /// Returns whether the answer was correct.
    pub fn answer(&mut self, index: usize) -> Result<bool, DomainError> {
        let question = self.current().ok_or_else(|| {
            DomainError::InvalidRequest("the quiz is already finished".into())
        })?;
        if index >= question.options().len() {
            return Err(DomainError::InvalidRequest(format!(
                "option {} does not exist",
                index + 1
            )));
        }
        let correct = question.is_correct(index);
        self.answers.push(index);
        Ok(correct)
    }

    pub fn is_finished(&self) -> bool {
        self.answers.len() >= self.questions.len()
    }

    pub fn score(&self) -> usize {
        self.answers
            .iter()
            .zip(&self.questions)
            .filter(|(chosen, q)| q.is_correct(**chosen))
            .count()
    }

    pub fn results(&self) -> Vec<QuestionResult> {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, question)| {
                let chosen = self.answers.get(i).copied();
                QuestionResult {
                    question: question.clone(),
                    chosen,
                    correct: chosen.is_some_and(|c| question.is_correct(c)),
                }
            })
            .collect()
    }
}
