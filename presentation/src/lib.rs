//! Presentation layer for ai-quiz
//!
//! This crate contains CLI definitions, console output formatting,
//! progress reporters, and the interactive terminal UI.

pub mod cli;
pub mod output;
pub mod progress;
pub mod tui;

// Re-export commonly used types
pub use cli::commands::{
    Cli, Command, GenerateArgs, KeyCommand, ModeArg, QuestionCommand, SourceArgs, SourceCommand,
    TopicCommand,
};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use tui::TuiApp;
