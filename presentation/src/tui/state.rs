//! TUI application state
//!
//! Single source of truth for everything the TUI renders. Only the
//! [`TuiApp`](super::TuiApp) select! loop mutates it; key handling returns
//! an [`Effect`] for the loop to perform instead of doing I/O here.

use super::event::{Effect, GenerationEvent};
use super::mode::{Action, Mode};
use quiz_application::{GenerateError, GenerationOutput, KeyStatus, RepositoryError};
use quiz_domain::{
    ApiKey, GenerationMode, GenerationRequest, GenerationState, MAX_QUESTIONS_PER_REQUEST,
    QuizSession, SavePolicy, Source, Topic,
};
use std::time::{Duration, Instant};

/// Screens of the quiz flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Topics,
    Sources,
    Setup,
    Question,
    Results,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Topics => "Topics",
            Self::Sources => "Sources",
            Self::Setup => "New quiz",
            Self::Question => "Question",
            Self::Results => "Results",
        }
    }
}

/// API key entry overlay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPrompt {
    pub input: String,
    pub error: Option<String>,
}

/// Verdict on the last answered question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub message: String,
}

/// Central TUI state, owned by the TuiApp select! loop
pub struct TuiState {
    pub mode: Mode,
    pub screen: Screen,

    // -- Library --
    pub topics: Vec<Topic>,
    pub topic_cursor: usize,
    /// 0 is "any source", then the topic's sources in order
    pub source_cursor: usize,

    // -- Quiz setup --
    pub count: usize,
    pub generation_mode: GenerationMode,
    pub save_policy: SavePolicy,

    // -- Background work --
    /// Some while a generation task is in flight
    pub generation: Option<GenerationState>,
    pub skipped_blocks: usize,
    pub validating: bool,

    // -- Quiz --
    pub session: Option<QuizSession>,
    /// Topic and source the current session was drawn from
    pub session_source: Option<(String, String)>,
    pub feedback: Option<Feedback>,
    pub delivery_note: Option<String>,
    /// Outcome of requeueing the finished quiz, shown on the results screen
    pub review_note: Option<String>,

    // -- Key --
    pub key_prompt: Option<KeyPrompt>,
    pub has_key: bool,
    pub model_name: String,

    // -- Overlay --
    pub show_help: bool,
    pub flash_message: Option<(String, Instant)>,

    // -- Lifecycle --
    pub should_quit: bool,
}

impl TuiState {
    pub fn new(count: usize, generation_mode: GenerationMode) -> Self {
        Self {
            mode: Mode::default(),
            screen: Screen::default(),
            topics: Vec::new(),
            topic_cursor: 0,
            source_cursor: 0,
            count: count.clamp(1, MAX_QUESTIONS_PER_REQUEST),
            generation_mode,
            save_policy: SavePolicy::default(),
            generation: None,
            skipped_blocks: 0,
            validating: false,
            session: None,
            session_source: None,
            feedback: None,
            delivery_note: None,
            review_note: None,
            key_prompt: None,
            has_key: false,
            model_name: String::new(),
            show_help: false,
            flash_message: None,
            should_quit: false,
        }
    }

    pub fn with_save_policy(mut self, policy: SavePolicy) -> Self {
        self.save_policy = policy;
        self
    }

    // -- Queries --

    pub fn selected_topic(&self) -> Option<&Topic> {
        self.topics.get(self.topic_cursor)
    }

    /// The explicitly chosen source; None means a weighted random pick
    pub fn selected_source(&self) -> Option<&Source> {
        let index = self.source_cursor.checked_sub(1)?;
        self.selected_topic()?.sources().get(index)
    }

    pub fn is_generating(&self) -> bool {
        self.generation.is_some()
    }

    /// Score line for the results screen
    pub fn score_text(&self) -> String {
        match &self.session {
            Some(session) => format!("{} of {}", session.score(), session.len()),
            None => "0 of 0".to_string(),
        }
    }

    // -- Library updates --

    /// Replace the topic list, keeping the selection when it still exists
    pub fn set_topics(&mut self, topics: Vec<Topic>) {
        let selected = self.selected_topic().map(|t| t.name().to_lowercase());
        self.topics = topics;

        match selected.and_then(|name| {
            self.topics
                .iter()
                .position(|t| t.name().to_lowercase() == name)
        }) {
            Some(index) => self.topic_cursor = index,
            None => {
                self.topic_cursor = self.topic_cursor.min(self.topics.len().saturating_sub(1));
                if matches!(self.screen, Screen::Sources | Screen::Setup) {
                    self.screen = Screen::Topics;
                    self.source_cursor = 0;
                }
            }
        }

        let source_rows = self.selected_topic().map_or(0, |t| t.sources().len());
        self.source_cursor = self.source_cursor.min(source_rows);
    }

    // -- Flash --

    pub fn flash(&mut self, message: impl Into<String>) {
        self.flash_message = Some((message.into(), Instant::now()));
    }

    pub fn expire_flash(&mut self, max_age: Duration) {
        if let Some((_, at)) = &self.flash_message
            && at.elapsed() > max_age
        {
            self.flash_message = None;
        }
    }

    // -- Key handling --

    pub fn handle_action(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::None => return None,
            Action::Quit => {
                self.should_quit = true;
                return None;
            }
            _ => {}
        }

        if self.show_help {
            if matches!(action, Action::ShowHelp | Action::Back | Action::Select) {
                self.show_help = false;
            }
            return None;
        }

        if self.mode == Mode::KeyEntry {
            return self.handle_key_entry(action);
        }

        match action {
            Action::ShowHelp => {
                self.show_help = true;
                return None;
            }
            Action::OpenKeyPrompt => {
                self.open_key_prompt(None);
                return None;
            }
            Action::Reload => return Some(Effect::Reload),
            _ => {}
        }

        if self.is_generating() {
            self.flash("Questions are on their way...");
            return None;
        }

        match self.screen {
            Screen::Topics => self.on_topics(action),
            Screen::Sources => self.on_sources(action),
            Screen::Setup => self.on_setup(action),
            Screen::Question => self.on_question(action),
            Screen::Results => self.on_results(action),
        }
    }

    fn on_topics(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::Up => self.topic_cursor = self.topic_cursor.saturating_sub(1),
            Action::Down => {
                if self.topic_cursor + 1 < self.topics.len() {
                    self.topic_cursor += 1;
                }
            }
            Action::Select => match self.selected_topic() {
                None => self.flash("No topics yet. Add one with `ai-quiz topic add <NAME>`"),
                Some(topic) if topic.sources().is_empty() => {
                    let message = format!(
                        "'{}' has no sources. Add one with `ai-quiz source add`",
                        topic.name()
                    );
                    self.flash(message);
                }
                Some(_) => {
                    self.source_cursor = 0;
                    self.screen = Screen::Sources;
                }
            },
            _ => {}
        }
        None
    }

    fn on_sources(&mut self, action: Action) -> Option<Effect> {
        let rows = self.selected_topic().map_or(0, |t| t.sources().len()) + 1;
        match action {
            Action::Up => self.source_cursor = self.source_cursor.saturating_sub(1),
            Action::Down => {
                if self.source_cursor + 1 < rows {
                    self.source_cursor += 1;
                }
            }
            Action::Select => self.screen = Screen::Setup,
            Action::Back => self.screen = Screen::Topics,
            _ => {}
        }
        None
    }

    fn on_setup(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::MoreQuestions | Action::Up => {
                self.count = (self.count + 1).min(MAX_QUESTIONS_PER_REQUEST)
            }
            Action::FewerQuestions | Action::Down => self.count = self.count.saturating_sub(1).max(1),
            Action::ToggleMode => {
                self.generation_mode = match self.generation_mode {
                    GenerationMode::Reuse => GenerationMode::Generate,
                    GenerationMode::Generate => GenerationMode::Reuse,
                }
            }
            Action::Select => return self.start_generation(),
            Action::Back => self.screen = Screen::Sources,
            _ => {}
        }
        None
    }

    fn start_generation(&mut self) -> Option<Effect> {
        let topic = self.selected_topic()?;
        let mut request = GenerationRequest::new(topic.name(), self.count)
            .with_mode(self.generation_mode);
        if let Some(source) = self.selected_source() {
            request = request.with_source(source.name());
        }

        self.generation = Some(GenerationState::Idle);
        self.skipped_blocks = 0;
        self.feedback = None;
        self.delivery_note = None;
        self.review_note = None;
        Some(Effect::Generate(request))
    }

    fn on_question(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::Answer(index) => return self.answer(index),
            Action::Back => {
                self.session = None;
                self.feedback = None;
                self.screen = Screen::Setup;
                self.flash("Quiz abandoned");
            }
            _ => {}
        }
        None
    }

    fn answer(&mut self, index: usize) -> Option<Effect> {
        let session = self.session.as_mut()?;
        let question = session.current().cloned()?;

        match session.answer(index) {
            Ok(correct) => {
                let message = if correct {
                    "Correct!".to_string()
                } else {
                    format!(
                        "Wrong. The answer was {}) {}",
                        question.correct_label(),
                        question.correct_option()
                    )
                };
                self.feedback = Some(Feedback { correct, message });
                if session.is_finished() {
                    self.screen = Screen::Results;
                    return self.finish_quiz();
                }
            }
            Err(e) => self.flash(e.to_string()),
        }
        None
    }

    /// Ask the loop to requeue what the save policy keeps from the quiz
    fn finish_quiz(&mut self) -> Option<Effect> {
        let results = self.session.as_ref()?.results();
        let questions = self.save_policy.select(&results);
        if questions.is_empty() {
            return None;
        }
        let (topic, source) = self.session_source.clone()?;
        Some(Effect::Requeue {
            topic,
            source,
            questions,
        })
    }

    /// Record how requeueing the finished quiz went
    pub fn apply_requeue(&mut self, result: Result<usize, RepositoryError>) {
        match result {
            Ok(count) => {
                self.review_note = Some(format!("{} question(s) queued for review", count))
            }
            Err(e) => self.flash(format!("Could not queue questions for review: {}", e)),
        }
    }

    fn on_results(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::Select => self.screen = Screen::Setup,
            Action::Back => self.screen = Screen::Topics,
            _ => {}
        }
        None
    }

    // -- API key prompt --

    pub fn open_key_prompt(&mut self, error: Option<String>) {
        self.key_prompt = Some(KeyPrompt {
            input: String::new(),
            error,
        });
        self.mode = Mode::KeyEntry;
    }

    fn close_key_prompt(&mut self) {
        self.key_prompt = None;
        self.mode = Mode::Browse;
    }

    fn handle_key_entry(&mut self, action: Action) -> Option<Effect> {
        let validating = self.validating;
        let prompt = self.key_prompt.get_or_insert_with(KeyPrompt::default);

        match action {
            Action::InsertChar(c) if !validating => prompt.input.push(c),
            Action::DeleteChar if !validating => {
                prompt.input.pop();
            }
            Action::Back => self.close_key_prompt(),
            Action::Select if validating => self.flash("Already checking a key..."),
            Action::Select => match ApiKey::new(prompt.input.as_str()) {
                Ok(key) => {
                    prompt.error = None;
                    self.validating = true;
                    return Some(Effect::ValidateKey(key));
                }
                Err(_) => prompt.error = Some("Enter a key first".to_string()),
            },
            _ => {}
        }
        None
    }

    /// Apply the verdict of a background key check. The loop has already
    /// persisted a valid key.
    pub fn apply_key_status(&mut self, status: KeyStatus) {
        self.validating = false;
        match status {
            KeyStatus::Valid => {
                self.has_key = true;
                self.close_key_prompt();
                self.flash("API key saved");
            }
            KeyStatus::Invalid => self.key_rejected("The endpoint rejected this key"),
            KeyStatus::NetworkError => {
                self.key_rejected("Could not reach the endpoint. The key was not saved")
            }
        }
    }

    /// Report a failed key check in the prompt, or as a flash when the
    /// prompt was closed in the meantime.
    pub fn key_rejected(&mut self, message: impl Into<String>) {
        self.validating = false;
        let message = message.into();
        match self.key_prompt.as_mut() {
            Some(prompt) => prompt.error = Some(message),
            None => self.flash(message),
        }
    }

    // -- Generation --

    /// Apply an event from the generation task. Returns `Effect::Reload`
    /// once the task has finished, since stored questions changed.
    pub fn apply_generation(&mut self, event: GenerationEvent) -> Option<Effect> {
        match event {
            GenerationEvent::State(state) => {
                if self.generation.is_some() {
                    self.generation = Some(state);
                }
                None
            }
            GenerationEvent::Skipped(_) => {
                self.skipped_blocks += 1;
                None
            }
            GenerationEvent::Finished(Ok(output)) if output.questions.is_empty() => {
                self.generation = None;
                self.flash(format!(
                    "No usable questions came back (0 of {}, {} block(s) skipped)",
                    output.requested,
                    output.skipped.len()
                ));
                Some(Effect::Reload)
            }
            GenerationEvent::Finished(Ok(output)) => {
                self.generation = None;
                self.delivery_note = Some(delivery_note(&output));
                self.feedback = None;
                self.session_source = Some((output.topic.clone(), output.source.clone()));
                self.session = Some(QuizSession::new(output.questions));
                self.screen = Screen::Question;
                Some(Effect::Reload)
            }
            GenerationEvent::Finished(Err(e)) => {
                self.generation = None;
                self.generation_failed(&e);
                None
            }
        }
    }

    fn generation_failed(&mut self, error: &GenerateError) {
        if error.needs_new_key() {
            self.has_key = false;
            self.open_key_prompt(Some(error.to_string()));
        } else if error.is_retryable() {
            self.flash(format!("{} (Enter to retry)", error));
        } else {
            self.flash(error.to_string());
        }
    }
}

/// One-line summary of a delivery for the question screen
fn delivery_note(output: &GenerationOutput) -> String {
    let mut note = format!(
        "{} from '{}': {} reused, {} new",
        output.questions.len(),
        output.source,
        output.reused,
        output.generated
    );
    if output.is_partial() {
        note.push_str(&format!(" (only {} of {} could be produced)", output.questions.len(), output.requested));
    }
    if output.storage_warning.is_some() {
        note.push_str("; new questions were not saved");
    }
    note
}
