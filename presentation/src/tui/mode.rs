//! TUI input modes and key mapping
//!
//! - Browse mode: navigation, quiz answers and shortcuts
//! - KeyEntry mode: typing an API key into the prompt

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    KeyEntry,
}

impl Mode {
    /// Get the mode indicator string for status line
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Browse => "QUIZ",
            Self::KeyEntry => "API KEY",
        }
    }

    /// Get the mode color for status line
    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            Self::Browse => Color::Blue,
            Self::KeyEntry => Color::Yellow,
        }
    }
}

/// User action derived from key events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    /// Enter: open the selection, start the quiz, continue
    Select,
    /// Esc: previous screen or close the prompt
    Back,
    /// Pick option 0..=3 of the current question
    Answer(usize),
    MoreQuestions,
    FewerQuestions,
    ToggleMode,
    OpenKeyPrompt,
    Reload,
    ShowHelp,
    Quit,
    InsertChar(char),
    DeleteChar,
    None,
}

/// Key event handler - maps key events to actions based on current mode
pub struct KeyHandler;

impl KeyHandler {
    /// Handle key event in the given mode
    pub fn handle(mode: Mode, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        match mode {
            Mode::Browse => Self::handle_browse(key),
            Mode::KeyEntry => Self::handle_key_entry(key),
        }
    }

    fn handle_browse(key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Esc | KeyCode::Backspace => Action::Back,
            KeyCode::Enter => Action::Select,

            // Navigation
            KeyCode::Char('k') | KeyCode::Up => Action::Up,
            KeyCode::Char('j') | KeyCode::Down => Action::Down,

            // Answers by letter or number
            KeyCode::Char(c @ 'a'..='d') => Action::Answer(c as usize - 'a' as usize),
            KeyCode::Char(c @ 'A'..='D') => Action::Answer(c as usize - 'A' as usize),
            KeyCode::Char(c @ '1'..='4') => Action::Answer(c as usize - '1' as usize),

            // Quiz setup
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => Action::MoreQuestions,
            KeyCode::Char('-') | KeyCode::Left => Action::FewerQuestions,
            KeyCode::Char('m') => Action::ToggleMode,

            KeyCode::Char('K') => Action::OpenKeyPrompt,
            KeyCode::Char('r') => Action::Reload,
            KeyCode::Char('?') => Action::ShowHelp,
            _ => Action::None,
        }
    }

    fn handle_key_entry(key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::Back,
            KeyCode::Enter => Action::Select,
            KeyCode::Backspace => Action::DeleteChar,
            KeyCode::Char(c) => Action::InsertChar(c),
            _ => Action::None,
        }
    }
}
