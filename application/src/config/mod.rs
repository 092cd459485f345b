//! Application-level configuration.
//!
//! - [`QuizBehavior`]: how generation requests are filled when the caller
//!   leaves details open

pub mod quiz_behavior;

pub use quiz_behavior::QuizBehavior;
