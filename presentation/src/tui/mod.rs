//! TUI (Text User Interface) module for ai-quiz
//!
//! Topic and source pickers, quiz setup, the question loop and results,
//! plus an API key prompt, rendered with ratatui.

mod app;
mod event;
mod mode;
mod progress;
mod state;
mod widgets;

pub use app::TuiApp;
pub use event::{Effect, GenerationEvent};
pub use mode::{Action, KeyHandler, Mode};
pub use progress::TuiProgressBridge;
pub use state::{Feedback, KeyPrompt, Screen, TuiState};
