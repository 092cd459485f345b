//! Generate Questions use case
//!
//! Fills a quiz request from stored questions, the AI, or both:
//!
//! ```text
//! request ─▶ pick source ─▶ Reuse?    take least-served stored questions
//!                           Generate? take unused ones if enough are stored
//!                              │
//!                              ▼ shortfall > 0
//!          prompt ─▶ completion ─▶ parse ─▶ drop known stems ─▶ store
//!                              │
//!                              ▼
//!                   mark delivered questions served
//! ```

use crate::ports::completion_gateway::{CompletionGateway, GatewayError};
use crate::ports::progress::{GenerationProgress, NoProgress};
use crate::ports::quiz_repository::{QuizRepository, RepositoryError};
use quiz_domain::{
    DomainError, GenerationMode, GenerationRequest, GenerationState, Question, QuizPromptTemplate,
    SkippedBlock, Source, StoredQuestion, pick_source, parse_questions,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while filling a generation request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// Bad count, unknown topic or source, or a source without content
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No key is stored, or the endpoint rejected it
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl GenerateError {
    /// Only network failures are worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerateError::Network(_))
    }

    /// The user has to enter a different API key before trying again.
    pub fn needs_new_key(&self) -> bool {
        matches!(self, GenerateError::Auth(_))
    }
}

impl From<DomainError> for GenerateError {
    fn from(e: DomainError) -> Self {
        GenerateError::InvalidRequest(e.to_string())
    }
}

impl From<GatewayError> for GenerateError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Auth(msg) => GenerateError::Auth(msg),
            GatewayError::Network(msg) => GenerateError::Network(msg),
            GatewayError::Service { status, message } => {
                GenerateError::Service(format!("HTTP {}: {}", status, message))
            }
            GatewayError::MalformedResponse(msg) => GenerateError::Service(msg),
        }
    }
}

impl From<RepositoryError> for GenerateError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Domain(d) => d.into(),
            other => GenerateError::Storage(other.to_string()),
        }
    }
}

/// Questions delivered for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutput {
    pub topic: String,
    pub source: String,
    /// Reused questions first, then freshly generated ones
    pub questions: Vec<Question>,
    pub reused: usize,
    pub generated: usize,
    pub requested: usize,
    /// Completion blocks that did not yield a question
    pub skipped: Vec<SkippedBlock>,
    /// Set when new questions were delivered but could not be saved
    pub storage_warning: Option<String>,
}

impl GenerationOutput {
    /// Fewer questions than requested were delivered.
    pub fn is_partial(&self) -> bool {
        self.questions.len() < self.requested
    }
}

/// Use case for filling a quiz with questions
pub struct GenerateQuestionsUseCase<G: CompletionGateway + 'static, R: QuizRepository + 'static> {
    gateway: Arc<G>,
    repository: Arc<R>,
    use_priorities: bool,
}

impl<G: CompletionGateway + 'static, R: QuizRepository + 'static> Clone
    for GenerateQuestionsUseCase<G, R>
{
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            repository: Arc::clone(&self.repository),
            use_priorities: self.use_priorities,
        }
    }
}

impl<G: CompletionGateway + 'static, R: QuizRepository + 'static> GenerateQuestionsUseCase<G, R> {
    pub fn new(gateway: Arc<G>, repository: Arc<R>) -> Self {
        Self {
            gateway,
            repository,
            use_priorities: true,
        }
    }

    /// Weight random source picks by importance (on by default)
    pub fn with_priorities(mut self, enabled: bool) -> Self {
        self.use_priorities = enabled;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutput, GenerateError> {
        self.execute_with_progress(request, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: GenerationRequest,
        progress: &dyn GenerationProgress,
    ) -> Result<GenerationOutput, GenerateError> {
        progress.on_state(GenerationState::Idle);

        match self.fill(&request, progress).await {
            Ok(output) => {
                info!(
                    "Delivered {} question(s) for {}/{} ({} reused, {} generated)",
                    output.questions.len(),
                    output.topic,
                    output.source,
                    output.reused,
                    output.generated
                );
                progress.on_state(GenerationState::Delivered);
                Ok(output)
            }
            Err(e) => {
                warn!("Generation for topic '{}' failed: {}", request.topic, e);
                progress.on_state(GenerationState::Failed);
                Err(e)
            }
        }
    }

    async fn fill(
        &self,
        request: &GenerationRequest,
        progress: &dyn GenerationProgress,
    ) -> Result<GenerationOutput, GenerateError> {
        request.validate()?;

        let topic = self.repository.topic(&request.topic).await?;
        let source = match &request.source {
            Some(name) => topic.source(name).ok_or_else(|| DomainError::SourceNotFound {
                topic: topic.name().to_string(),
                source_name: name.clone(),
            })?,
            None => {
                let mut rng = rand::thread_rng();
                pick_source(&topic, self.use_priorities, &mut rng).ok_or_else(|| {
                    GenerateError::InvalidRequest(format!(
                        "topic '{}' has no sources",
                        topic.name()
                    ))
                })?
            }
        };
        debug!(
            "Filling {} question(s) from {}/{} in {} mode",
            request.count,
            topic.name(),
            source.name(),
            request.mode
        );

        let mut output = GenerationOutput {
            topic: topic.name().to_string(),
            source: source.name().to_string(),
            questions: Vec::new(),
            reused: 0,
            generated: 0,
            requested: request.count,
            skipped: Vec::new(),
            storage_warning: None,
        };

        output.questions = match request.mode {
            GenerationMode::Reuse => Self::least_served(source, request.count),
            GenerationMode::Generate => Self::unused(source, request.count),
        };
        output.reused = output.questions.len();

        let shortfall = request.count - output.questions.len();
        if shortfall > 0 {
            let fresh = self
                .generate(topic.name(), source, shortfall, &mut output, progress)
                .await?;
            output.generated = fresh.len();
            output.questions.extend(fresh);
        }

        if output.questions.is_empty() {
            warn!(
                "No usable questions for {}/{} ({} block(s) skipped)",
                output.topic,
                output.source,
                output.skipped.len()
            );
            return Ok(output);
        }

        if let Err(e) = self
            .repository
            .mark_served(&output.topic, &output.source, &output.questions)
            .await
        {
            warn!("Could not record served questions: {}", e);
            output.storage_warning.get_or_insert(e.to_string());
        }

        Ok(output)
    }

    /// Up to `count` stored questions, least served first, ties in stored order.
    fn least_served(source: &Source, count: usize) -> Vec<Question> {
        let mut stored: Vec<_> = source.questions().iter().collect();
        stored.sort_by_key(|q| q.served);
        Self::distinct(stored, count)
    }

    /// Exactly `count` never-served questions in stored order, or none when
    /// fewer are stored.
    fn unused(source: &Source, count: usize) -> Vec<Question> {
        let unused = Self::distinct(source.questions().iter().filter(|q| q.served == 0), count);
        if unused.len() < count {
            return Vec::new();
        }
        unused
    }

    /// First `count` questions with distinct normalized stems.
    fn distinct<'a>(
        stored: impl IntoIterator<Item = &'a StoredQuestion>,
        count: usize,
    ) -> Vec<Question> {
        let mut seen = HashSet::new();
        stored
            .into_iter()
            .filter(|q| seen.insert(q.question.normalized_stem()))
            .take(count)
            .map(|q| q.question.clone())
            .collect()
    }

    /// Ask the AI for `count` questions and store the ones with new stems.
    async fn generate(
        &self,
        topic: &str,
        source: &Source,
        count: usize,
        output: &mut GenerationOutput,
        progress: &dyn GenerationProgress,
    ) -> Result<Vec<Question>, GenerateError> {
        let key = self
            .repository
            .get_api_key()
            .await?
            .ok_or_else(|| GenerateError::Auth("no API key configured".into()))?;
        let prompt = QuizPromptTemplate::generation_prompt(topic, source, count)?;

        info!("Requesting {} question(s) for {}/{}", count, topic, source.name());
        progress.on_state(GenerationState::Requesting);
        let raw = self
            .gateway
            .complete(QuizPromptTemplate::system(), &prompt, &key)
            .await?;
        debug!("Completion received: {} bytes", raw.len());

        progress.on_state(GenerationState::Parsing);
        let report = parse_questions(&raw, count);
        for skipped in &report.skipped {
            warn!("Skipped block {}: {}", skipped.block, skipped.reason);
            progress.on_skipped(skipped);
        }
        if report.is_partial() {
            warn!(
                "Completion yielded {} of {} question(s)",
                report.questions.len(),
                count
            );
        }
        output.skipped = report.skipped;

        let mut seen: HashSet<String> = source
            .questions()
            .iter()
            .map(|q| q.question.normalized_stem())
            .collect();
        let fresh: Vec<Question> = report
            .questions
            .into_iter()
            .filter(|q| {
                let new = seen.insert(q.normalized_stem());
                if !new {
                    debug!("Dropping duplicate stem: {}", q.stem());
                }
                new
            })
            .collect();

        if !fresh.is_empty()
            && let Err(e) = self
                .repository
                .add_questions(topic, source.name(), fresh.clone())
                .await
        {
            warn!("Generated questions could not be saved: {}", e);
            output.storage_warning = Some(e.to_string());
        }

        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::completion_gateway::KeyStatus;
    use async_trait::async_trait;
    use quiz_domain::{ApiKey, Library, SkipReason, SourceDraft, Topic};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // ==================== Fakes ====================

    /// Gateway that replays scripted completions and records prompts
    struct ScriptedGateway {
        responses: Mutex<VecDeque<Result<String, GatewayError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionGateway for ScriptedGateway {
        async fn complete(
            &self,
            _system: &str,
            prompt: &str,
            _key: &ApiKey,
        ) -> Result<String, GatewayError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Network("no scripted response".into())))
        }

        async fn validate_key(&self, _key: &ApiKey) -> KeyStatus {
            KeyStatus::Valid
        }
    }

    /// Repository over an in-memory library
    struct MemoryRepository {
        library: Mutex<Library>,
        key: Mutex<Option<ApiKey>>,
        fail_writes: bool,
    }

    impl MemoryRepository {
        fn new(library: Library, key: Option<&str>) -> Self {
            Self {
                library: Mutex::new(library),
                key: Mutex::new(key.map(|k| ApiKey::new(k).unwrap())),
                fail_writes: false,
            }
        }

        fn failing_writes(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        fn stored(&self, topic: &str, source: &str) -> Vec<StoredQuestion> {
            self.library
                .lock()
                .unwrap()
                .questions(topic, source)
                .unwrap()
                .to_vec()
        }

        fn write<T>(
            &self,
            f: impl FnOnce(&mut Library) -> Result<T, DomainError>,
        ) -> Result<T, RepositoryError> {
            if self.fail_writes {
                return Err(RepositoryError::Io(std::io::Error::other("disk full")));
            }
            Ok(f(&mut self.library.lock().unwrap())?)
        }
    }

    #[async_trait]
    impl QuizRepository for MemoryRepository {
        async fn list_topics(&self) -> Result<Vec<Topic>, RepositoryError> {
            Ok(self.library.lock().unwrap().topics().to_vec())
        }

        async fn topic(&self, name: &str) -> Result<Topic, RepositoryError> {
            self.library
                .lock()
                .unwrap()
                .topic(name)
                .cloned()
                .ok_or_else(|| DomainError::TopicNotFound(name.to_string()).into())
        }

        async fn add_topic(&self, name: &str) -> Result<(), RepositoryError> {
            self.write(|lib| lib.add_topic(name).map(|_| ()))
        }

        async fn rename_topic(&self, name: &str, new_name: &str) -> Result<(), RepositoryError> {
            self.write(|lib| lib.rename_topic(name, new_name))
        }

        async fn remove_topic(&self, name: &str) -> Result<(), RepositoryError> {
            self.write(|lib| lib.remove_topic(name).map(|_| ()))
        }

        async fn add_source(&self, topic: &str, draft: SourceDraft) -> Result<(), RepositoryError> {
            self.write(|lib| lib.add_source(topic, draft))
        }

        async fn update_source(
            &self,
            topic: &str,
            source: &str,
            draft: SourceDraft,
        ) -> Result<(), RepositoryError> {
            self.write(|lib| lib.update_source(topic, source, draft))
        }

        async fn remove_source(&self, topic: &str, source: &str) -> Result<(), RepositoryError> {
            self.write(|lib| lib.remove_source(topic, source).map(|_| ()))
        }

        async fn get_questions(
            &self,
            topic: &str,
            source: &str,
        ) -> Result<Vec<StoredQuestion>, RepositoryError> {
            Ok(self.library.lock().unwrap().questions(topic, source)?.to_vec())
        }

        async fn add_questions(
            &self,
            topic: &str,
            source: &str,
            questions: Vec<Question>,
        ) -> Result<Vec<Question>, RepositoryError> {
            self.write(|lib| lib.add_questions(topic, source, questions))
        }

        async fn remove_question(
            &self,
            topic: &str,
            source: &str,
            index: usize,
        ) -> Result<(), RepositoryError> {
            self.write(|lib| lib.remove_question(topic, source, index).map(|_| ()))
        }

        async fn mark_served(
            &self,
            topic: &str,
            source: &str,
            questions: &[Question],
        ) -> Result<(), RepositoryError> {
            self.write(|lib| lib.mark_served(topic, source, questions))
        }

        async fn requeue_questions(
            &self,
            topic: &str,
            source: &str,
            questions: &[Question],
        ) -> Result<usize, RepositoryError> {
            self.write(|lib| lib.requeue(topic, source, questions))
        }

        async fn get_api_key(&self) -> Result<Option<ApiKey>, RepositoryError> {
            Ok(self.key.lock().unwrap().clone())
        }

        async fn set_api_key(&self, key: &ApiKey) -> Result<(), RepositoryError> {
            *self.key.lock().unwrap() = Some(key.clone());
            Ok(())
        }
    }

    /// Records every reported state
    #[derive(Default)]
    struct RecordingProgress {
        states: Mutex<Vec<GenerationState>>,
        skipped: Mutex<usize>,
    }

    impl GenerationProgress for RecordingProgress {
        fn on_state(&self, state: GenerationState) {
            self.states.lock().unwrap().push(state);
        }

        fn on_skipped(&self, _block: &SkippedBlock) {
            *self.skipped.lock().unwrap() += 1;
        }
    }

    // ==================== Helpers ====================

    fn completion(stems: &[&str]) -> String {
        stems
            .iter()
            .enumerate()
            .map(|(i, stem)| {
                format!(
                    "### Question {}\n{}\nA) Nucleus\nB) Ribosome\nC) Membrane\nD) Vacuole\nAnswer: A\n",
                    i + 1,
                    stem
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn question(stem: &str) -> Question {
        Question::try_new(
            stem,
            vec!["Nucleus".into(), "Ribosome".into(), "Membrane".into(), "Vacuole".into()],
            0,
        )
        .unwrap()
    }

    fn biology() -> Library {
        let mut lib = Library::new();
        lib.add_topic("Biology").unwrap();
        lib.add_source(
            "Biology",
            SourceDraft::new(
                "Cell structure notes",
                "The nucleus holds DNA. Ribosomes build proteins.",
            ),
        )
        .unwrap();
        lib
    }

    fn use_case(
        gateway: ScriptedGateway,
        repository: MemoryRepository,
    ) -> (
        GenerateQuestionsUseCase<ScriptedGateway, MemoryRepository>,
        Arc<ScriptedGateway>,
        Arc<MemoryRepository>,
    ) {
        let gateway = Arc::new(gateway);
        let repository = Arc::new(repository);
        (
            GenerateQuestionsUseCase::new(Arc::clone(&gateway), Arc::clone(&repository)),
            gateway,
            repository,
        )
    }

    fn request(count: usize, mode: GenerationMode) -> GenerationRequest {
        GenerationRequest::new("Biology", count)
            .with_source("Cell structure notes")
            .with_mode(mode)
    }

    // ==================== Reuse / generate flow ====================

    #[tokio::test]
    async fn test_reuse_with_empty_store_generates_then_serves_from_store() {
        let gateway = ScriptedGateway::new(vec![Ok(completion(&[
            "What holds DNA?",
            "What builds proteins?",
            "What surrounds the cell?",
        ]))]);
        let (uc, gateway, repo) = use_case(gateway, MemoryRepository::new(biology(), Some("gsk_test")));

        let first = uc.execute(request(3, GenerationMode::Reuse)).await.unwrap();
        assert_eq!(first.questions.len(), 3);
        assert_eq!(first.generated, 3);
        assert_eq!(first.reused, 0);
        assert_eq!(gateway.calls(), 1);
        assert_eq!(repo.stored("Biology", "Cell structure notes").len(), 3);

        let second = uc.execute(request(2, GenerationMode::Reuse)).await.unwrap();
        assert_eq!(second.questions.len(), 2);
        assert_eq!(second.reused, 2);
        assert_eq!(second.generated, 0);
        assert_eq!(gateway.calls(), 1, "reuse hit must not call the AI");
    }

    #[tokio::test]
    async fn test_reuse_prefers_least_served() {
        let gateway = ScriptedGateway::new(vec![Ok(completion(&["One?", "Two?", "Three?"]))]);
        let (uc, _, repo) = use_case(gateway, MemoryRepository::new(biology(), Some("k")));

        uc.execute(request(3, GenerationMode::Reuse)).await.unwrap();
        // Every question served once; serve "Two?" again
        let two = Question::try_new(
            "Two?",
            vec!["Nucleus".into(), "Ribosome".into(), "Membrane".into(), "Vacuole".into()],
            0,
        )
        .unwrap();
        repo.mark_served("Biology", "Cell structure notes", &[two])
            .await
            .unwrap();

        let out = uc.execute(request(2, GenerationMode::Reuse)).await.unwrap();
        let stems: Vec<_> = out.questions.iter().map(|q| q.stem()).collect();
        assert_eq!(stems, vec!["One?", "Three?"]);

        let stored = repo.stored("Biology", "Cell structure notes");
        assert_eq!(stored.iter().map(|q| q.served).collect::<Vec<_>>(), vec![2, 2, 2]);
    }

    #[tokio::test]
    async fn test_reuse_tops_up_shortfall_with_generation() {
        let gateway = ScriptedGateway::new(vec![
            Ok(completion(&["One?"])),
            Ok(completion(&["Two?", "Three?"])),
        ]);
        let (uc, gateway, repo) = use_case(gateway, MemoryRepository::new(biology(), Some("k")));

        uc.execute(request(1, GenerationMode::Reuse)).await.unwrap();
        let out = uc.execute(request(3, GenerationMode::Reuse)).await.unwrap();

        assert_eq!(out.reused, 1);
        assert_eq!(out.generated, 2);
        assert_eq!(out.questions[0].stem(), "One?");
        assert_eq!(gateway.calls(), 2);
        assert!(gateway.prompts.lock().unwrap()[1].contains("exactly 2 multiple-choice"));
        assert_eq!(repo.stored("Biology", "Cell structure notes").len(), 3);
    }

    #[tokio::test]
    async fn test_generate_mode_serves_enough_unused_without_ai() {
        let mut lib = biology();
        lib.add_questions(
            "Biology",
            "Cell structure notes",
            vec![question("One?"), question("Two?"), question("Three?")],
        )
        .unwrap();
        let (uc, gateway, repo) =
            use_case(ScriptedGateway::new(vec![]), MemoryRepository::new(lib, Some("k")));

        let out = uc.execute(request(2, GenerationMode::Generate)).await.unwrap();
        assert_eq!(gateway.calls(), 0);
        assert_eq!(out.reused, 2);
        assert_eq!(out.generated, 0);
        let stems: Vec<_> = out.questions.iter().map(|q| q.stem()).collect();
        assert_eq!(stems, vec!["One?", "Two?"]);

        let stored = repo.stored("Biology", "Cell structure notes");
        assert_eq!(stored.iter().map(|q| q.served).collect::<Vec<_>>(), vec![1, 1, 0]);
    }

    #[tokio::test]
    async fn test_generate_mode_calls_ai_when_unused_run_short() {
        let gateway = ScriptedGateway::new(vec![
            Ok(completion(&["One?", "Two?"])),
            Ok(completion(&["Three?", "Four?"])),
        ]);
        let (uc, gateway, _) = use_case(gateway, MemoryRepository::new(biology(), Some("k")));

        uc.execute(request(2, GenerationMode::Generate)).await.unwrap();
        // Both stored questions have been served, so none count as unused
        let out = uc.execute(request(2, GenerationMode::Generate)).await.unwrap();
        assert_eq!(gateway.calls(), 2);
        assert_eq!(out.reused, 0);
        assert_eq!(out.questions[0].stem(), "Three?");
    }

    #[tokio::test]
    async fn test_reuse_skips_colliding_stems_in_loaded_library() {
        let json = r#"{"topics": [{"name": "Biology", "sources": [{
            "name": "Cell structure notes",
            "content": "The nucleus holds DNA.",
            "questions": [
                {"stem": "What holds DNA?", "options": ["a", "b", "c", "d"], "correct": 0,
                 "served": 0, "created_at": "2024-01-01T00:00:00Z"},
                {"stem": "what holds  dna", "options": ["a", "b", "c", "d"], "correct": 0,
                 "served": 0, "created_at": "2024-01-02T00:00:00Z"},
                {"stem": "What builds proteins?", "options": ["a", "b", "c", "d"], "correct": 0,
                 "served": 3, "created_at": "2024-01-03T00:00:00Z"}
            ]
        }]}]}"#;
        let lib: Library = serde_json::from_str(json).unwrap();
        let (uc, gateway, _) =
            use_case(ScriptedGateway::new(vec![]), MemoryRepository::new(lib, Some("k")));

        let out = uc.execute(request(2, GenerationMode::Reuse)).await.unwrap();
        let stems: Vec<_> = out.questions.iter().map(|q| q.normalized_stem()).collect();
        assert_eq!(stems, vec!["what holds dna", "what builds proteins"]);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_stems_are_never_returned() {
        let gateway = ScriptedGateway::new(vec![
            Ok(completion(&["What holds DNA?", "What builds proteins?"])),
            // Same stems modulo case, spacing and punctuation, plus one in-batch repeat
            Ok(completion(&[
                "what  holds DNA",
                "A new question?",
                "A new question.",
                "What builds proteins?!",
            ])),
        ]);
        let (uc, _, repo) = use_case(gateway, MemoryRepository::new(biology(), Some("k")));

        uc.execute(request(2, GenerationMode::Generate)).await.unwrap();
        let out = uc.execute(request(4, GenerationMode::Generate)).await.unwrap();

        assert_eq!(out.questions.len(), 1);
        assert_eq!(out.questions[0].stem(), "A new question?");
        assert!(out.is_partial());

        let stored = repo.stored("Biology", "Cell structure notes");
        let stems: HashSet<String> = stored.iter().map(|q| q.question.normalized_stem()).collect();
        assert_eq!(stems.len(), stored.len());
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn test_partial_parse_delivers_valid_blocks() {
        let raw = completion(&["One?", "Two?", "Three?"]).replacen("C) Membrane\n", "", 1);
        let gateway = ScriptedGateway::new(vec![Ok(raw)]);
        let (uc, _, _) = use_case(gateway, MemoryRepository::new(biology(), Some("k")));
        let progress = RecordingProgress::default();

        let out = uc
            .execute_with_progress(request(3, GenerationMode::Generate), &progress)
            .await
            .unwrap();
        assert_eq!(out.questions.len(), 2);
        assert_eq!(out.skipped.len(), 1);
        assert!(out.is_partial());
        assert_eq!(*progress.skipped.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unusable_response_is_empty_partial_output() {
        let raw = completion(&["One?"]).replacen("C) Membrane\n", "", 1);
        let gateway = ScriptedGateway::new(vec![Ok(raw)]);
        let (uc, _, repo) = use_case(gateway, MemoryRepository::new(biology(), Some("k")));
        let progress = RecordingProgress::default();

        let out = uc
            .execute_with_progress(request(1, GenerationMode::Reuse), &progress)
            .await
            .unwrap();
        assert!(out.questions.is_empty());
        assert!(out.is_partial());
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].reason, SkipReason::TooFewOptions { found: 3 });
        assert!(repo.stored("Biology", "Cell structure notes").is_empty());
        assert_eq!(
            progress.states.lock().unwrap().last(),
            Some(&GenerationState::Delivered)
        );
    }

    // ==================== Errors ====================

    #[tokio::test]
    async fn test_missing_key_is_auth_error() {
        let gateway = ScriptedGateway::new(vec![]);
        let (uc, gateway, _) = use_case(gateway, MemoryRepository::new(biology(), None));

        let err = uc
            .execute(request(2, GenerationMode::Reuse))
            .await
            .unwrap_err();
        assert!(err.needs_new_key());
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_gateway_errors_are_classified() {
        let gateway = ScriptedGateway::new(vec![
            Err(GatewayError::Auth("HTTP 401".into())),
            Err(GatewayError::Network("timed out".into())),
            Err(GatewayError::Service {
                status: 500,
                message: "boom".into(),
            }),
        ]);
        let (uc, _, _) = use_case(gateway, MemoryRepository::new(biology(), Some("k")));

        let auth = uc.execute(request(1, GenerationMode::Generate)).await.unwrap_err();
        assert!(auth.needs_new_key());
        assert!(!auth.is_retryable());

        let network = uc.execute(request(1, GenerationMode::Generate)).await.unwrap_err();
        assert!(network.is_retryable());

        let service = uc.execute(request(1, GenerationMode::Generate)).await.unwrap_err();
        assert_eq!(service, GenerateError::Service("HTTP 500: boom".into()));
    }

    #[tokio::test]
    async fn test_invalid_requests() {
        let gateway = ScriptedGateway::new(vec![]);
        let (uc, gateway, _) = use_case(gateway, MemoryRepository::new(biology(), Some("k")));

        for req in [
            GenerationRequest::new("Biology", 0),
            GenerationRequest::new("Chemistry", 2),
            GenerationRequest::new("Biology", 2).with_source("Missing"),
        ] {
            let err = uc.execute(req).await.unwrap_err();
            assert!(matches!(err, GenerateError::InvalidRequest(_)), "{:?}", err);
        }
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_topic_without_sources_is_invalid() {
        let mut lib = Library::new();
        lib.add_topic("Empty").unwrap();
        let (uc, _, _) = use_case(ScriptedGateway::new(vec![]), MemoryRepository::new(lib, Some("k")));
        let err = uc.execute(GenerationRequest::new("Empty", 1)).await.unwrap_err();
        assert!(matches!(err, GenerateError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_source_is_picked_when_not_named() {
        let gateway = ScriptedGateway::new(vec![Ok(completion(&["One?"]))]);
        let (uc, _, _) = use_case(gateway, MemoryRepository::new(biology(), Some("k")));
        let out = uc.execute(GenerationRequest::new("biology", 1)).await.unwrap();
        assert_eq!(out.topic, "Biology");
        assert_eq!(out.source, "Cell structure notes");
    }

    #[tokio::test]
    async fn test_storage_failure_still_delivers() {
        let gateway = ScriptedGateway::new(vec![Ok(completion(&["One?", "Two?"]))]);
        let repo = MemoryRepository::new(biology(), Some("k")).failing_writes();
        let (uc, _, repo) = use_case(gateway, repo);

        let out = uc.execute(request(2, GenerationMode::Generate)).await.unwrap();
        assert_eq!(out.questions.len(), 2);
        assert!(out.storage_warning.unwrap().contains("disk full"));
        assert!(repo.stored("Biology", "Cell structure notes").is_empty());
    }

    // ==================== Progress ====================

    #[tokio::test]
    async fn test_state_sequence_for_generation() {
        let gateway = ScriptedGateway::new(vec![Ok(completion(&["One?"]))]);
        let (uc, _, _) = use_case(gateway, MemoryRepository::new(biology(), Some("k")));
        let progress = RecordingProgress::default();

        uc.execute_with_progress(request(1, GenerationMode::Reuse), &progress)
            .await
            .unwrap();
        assert_eq!(
            *progress.states.lock().unwrap(),
            vec![
                GenerationState::Idle,
                GenerationState::Requesting,
                GenerationState::Parsing,
                GenerationState::Delivered
            ]
        );

        let reuse = RecordingProgress::default();
        uc.execute_with_progress(request(1, GenerationMode::Reuse), &reuse)
            .await
            .unwrap();
        assert_eq!(
            *reuse.states.lock().unwrap(),
            vec![GenerationState::Idle, GenerationState::Delivered]
        );
    }

    #[tokio::test]
    async fn test_state_sequence_for_failure() {
        let gateway = ScriptedGateway::new(vec![Err(GatewayError::Network("down".into()))]);
        let (uc, _, _) = use_case(gateway, MemoryRepository::new(biology(), Some("k")));
        let progress = RecordingProgress::default();

        uc.execute_with_progress(request(1, GenerationMode::Generate), &progress)
            .await
            .unwrap_err();
        assert_eq!(
            *progress.states.lock().unwrap(),
            vec![
                GenerationState::Idle,
                GenerationState::Requesting,
                GenerationState::Failed
            ]
        );
    }
}
