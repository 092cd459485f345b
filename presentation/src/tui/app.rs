//! TUI application: main loop
//!
//! Architecture:
//! ```text
//! TuiApp (select! loop)                  spawned tasks
//!   ├─ crossterm EventStream               ├─ GenerateQuestionsUseCase
//!   ├─ key_rx  (KeyValidationEvent)  <──── │    └─ TuiProgressBridge ─> gen_tx
//!   ├─ gen_rx  (GenerationEvent)     <──── └─ ValidateApiKeyUseCase ──> key_tx
//!   └─ tick_interval
//! ```
//!
//! Only the loop touches [`TuiState`]; tasks report through channels.

use super::event::{Effect, GenerationEvent};
use super::mode::KeyHandler;
use super::progress::TuiProgressBridge;
use super::state::{Screen, TuiState};
use super::widgets::{
    MainLayout, header::HeaderWidget, help::HelpWidget, key_prompt::KeyPromptWidget,
    library::{SourcesWidget, TopicsWidget},
    question::QuestionWidget,
    results::ResultsWidget,
    setup::SetupWidget,
    status_bar::StatusBarWidget,
};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::stream::StreamExt;
use quiz_application::{
    CompletionGateway, GenerateQuestionsUseCase, KeyStatus, KeyValidationEvent, QuizBehavior,
    QuizRepository, ValidateApiKeyUseCase,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How long a flash message stays in the status bar
const FLASH_TTL: Duration = Duration::from_secs(5);

/// Main TUI application
pub struct TuiApp<G: CompletionGateway + 'static, R: QuizRepository + 'static> {
    repository: Arc<R>,
    generate: GenerateQuestionsUseCase<G, R>,
    validate: ValidateApiKeyUseCase<G>,
    behavior: QuizBehavior,
    model_name: String,

    // -- Channels --
    key_tx: mpsc::UnboundedSender<KeyValidationEvent>,
    key_rx: mpsc::UnboundedReceiver<KeyValidationEvent>,
    gen_tx: mpsc::UnboundedSender<GenerationEvent>,
    gen_rx: mpsc::UnboundedReceiver<GenerationEvent>,
}

impl<G: CompletionGateway + 'static, R: QuizRepository + 'static> TuiApp<G, R> {
    pub fn new(gateway: Arc<G>, repository: Arc<R>, behavior: QuizBehavior) -> Self {
        let (key_tx, key_rx) = mpsc::unbounded_channel();
        let (gen_tx, gen_rx) = mpsc::unbounded_channel();

        let generate = GenerateQuestionsUseCase::new(Arc::clone(&gateway), Arc::clone(&repository))
            .with_priorities(behavior.use_priorities);
        let validate = ValidateApiKeyUseCase::new(gateway);

        Self {
            repository,
            generate,
            validate,
            behavior,
            model_name: String::new(),
            key_tx,
            key_rx,
            gen_tx,
            gen_rx,
        }
    }

    /// Model name shown in the header
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> io::Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Install panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(info);
        }));

        let result = self.event_loop(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        let mut state = TuiState::new(self.behavior.default_count, self.behavior.default_mode)
            .with_save_policy(self.behavior.save_policy);
        state.model_name = self.model_name.clone();
        self.load_topics(&mut state).await;
        state.has_key = match self.repository.get_api_key().await {
            Ok(key) => key.is_some(),
            Err(e) => {
                warn!("Could not read the stored API key: {}", e);
                false
            }
        };
        if !state.has_key {
            state.flash("No API key yet. Press K to enter one");
        }

        let mut event_stream = EventStream::new();
        let mut tick = tokio::time::interval(Duration::from_millis(250));

        loop {
            // Render
            terminal.draw(|frame| Self::render(frame, &state))?;

            if state.should_quit {
                break;
            }

            // select! on all event sources
            tokio::select! {
                // Terminal events (keyboard, resize)
                Some(Ok(term_event)) = event_stream.next() => {
                    if let Event::Key(key) = term_event
                        && key.kind == KeyEventKind::Press
                    {
                        let action = KeyHandler::handle(state.mode, key);
                        if let Some(effect) = state.handle_action(action) {
                            self.perform(&mut state, effect).await;
                        }
                    }
                }

                // Key checks from ValidateApiKeyUseCase
                Some(event) = self.key_rx.recv() => {
                    self.apply_key_validation(&mut state, event).await;
                }

                // Progress and results from the generation task
                Some(event) = self.gen_rx.recv() => {
                    if let Some(effect) = state.apply_generation(event) {
                        self.perform(&mut state, effect).await;
                    }
                }

                // Tick for flash expiry
                _ = tick.tick() => {
                    state.expire_flash(FLASH_TTL);
                }
            }
        }

        Ok(())
    }

    /// Render all widgets
    fn render(frame: &mut ratatui::Frame, state: &TuiState) {
        let layout = MainLayout::compute(frame.area());

        frame.render_widget(HeaderWidget::new(state), layout.header);
        match state.screen {
            Screen::Topics => frame.render_widget(TopicsWidget::new(state), layout.body),
            Screen::Sources => frame.render_widget(SourcesWidget::new(state), layout.body),
            Screen::Setup => frame.render_widget(SetupWidget::new(state), layout.body),
            Screen::Question => frame.render_widget(QuestionWidget::new(state), layout.body),
            Screen::Results => frame.render_widget(ResultsWidget::new(state), layout.body),
        }
        frame.render_widget(StatusBarWidget::new(state), layout.status_bar);

        if state.key_prompt.is_some() {
            let area = MainLayout::centered_overlay(60, 40, frame.area());
            frame.render_widget(KeyPromptWidget::new(state), area);
        }

        if state.show_help {
            let area = MainLayout::centered_overlay(70, 70, frame.area());
            frame.render_widget(HelpWidget::new(), area);
        }
    }

    async fn perform(&self, state: &mut TuiState, effect: Effect) {
        match effect {
            Effect::Generate(request) => {
                info!(
                    "Starting generation: {} x{} ({})",
                    request.topic, request.count, request.mode
                );
                let use_case = self.generate.clone();
                let tx = self.gen_tx.clone();
                tokio::spawn(async move {
                    let bridge = TuiProgressBridge::new(tx.clone());
                    let result = use_case.execute_with_progress(request, &bridge).await;
                    let _ = tx.send(GenerationEvent::Finished(result));
                });
            }
            Effect::ValidateKey(key) => {
                debug!("Checking API key {}", key.masked());
                self.validate.spawn(key, self.key_tx.clone());
            }
            Effect::Reload => self.load_topics(state).await,
            Effect::Requeue {
                topic,
                source,
                questions,
            } => {
                let result = self
                    .repository
                    .requeue_questions(&topic, &source, &questions)
                    .await;
                match &result {
                    Ok(count) => info!(
                        "Queued {} question(s) from {}/{} for review",
                        count, topic, source
                    ),
                    Err(e) => warn!("Could not queue questions for review: {}", e),
                }
                state.apply_requeue(result);
            }
        }
    }

    async fn apply_key_validation(&self, state: &mut TuiState, event: KeyValidationEvent) {
        if event.status == KeyStatus::Valid
            && let Err(e) = self.repository.set_api_key(&event.key).await
        {
            warn!("Could not save API key: {}", e);
            state.key_rejected(format!("The key works but could not be saved: {}", e));
            return;
        }
        state.apply_key_status(event.status);
    }

    async fn load_topics(&self, state: &mut TuiState) {
        match self.repository.list_topics().await {
            Ok(topics) => state.set_topics(topics),
            Err(e) => {
                warn!("Could not load topics: {}", e);
                state.flash(format!("Could not load topics: {}", e));
            }
        }
    }
}
