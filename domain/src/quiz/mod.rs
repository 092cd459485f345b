//! Quiz domain
//!
//! Question records, the completion parser, generation requests and quiz
//! sessions.

pub mod parsing;
pub mod question;
pub mod request;
pub mod session;

pub use parsing::{ParseOutcome, ParseReport, SkipReason, SkippedBlock, parse_questions};
pub use question::{OPTION_COUNT, OPTION_LABELS, Question, StoredQuestion, label_to_index};
pub use request::{GenerationMode, GenerationRequest, GenerationState};
pub use session::{QuestionResult, QuizSession, SavePolicy};
