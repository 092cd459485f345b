//! JSON file repository for the quiz library and API key.
//!
//! Layout of the data directory:
//!
//! ```text
//! <data_dir>/
//! ├── library.json   topics → sources → questions
//! └── api_key.json   {"api_key": "..."}
//! ```
//!
//! The whole library is held in memory. A mutation is applied to a copy,
//! the copy is written to a temp file and renamed over the old file, and
//! only then does the copy replace the in-memory snapshot. A failed write
//! therefore leaves both the file and the snapshot untouched.

use async_trait::async_trait;
use quiz_application::ports::quiz_repository::{QuizRepository, RepositoryError};
use quiz_domain::{ApiKey, DomainError, Library, Question, SourceDraft, StoredQuestion, Topic};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const LIBRARY_FILE: &str = "library.json";
pub const API_KEY_FILE: &str = "api_key.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyFile {
    #[serde(default)]
    api_key: String,
}

/// Repository storing everything as JSON under one directory
pub struct JsonQuizRepository {
    dir: PathBuf,
    library: Mutex<Library>,
    api_key: Mutex<Option<ApiKey>>,
    /// Returned by `get_api_key` while no key is stored
    fallback_key: Option<ApiKey>,
}

impl JsonQuizRepository {
    /// Open (or create) the data directory and load what is stored there.
    ///
    /// Missing files mean an empty library and no key; unreadable or
    /// corrupt files are errors.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        let library: Library = match read_if_exists(&dir.join(LIBRARY_FILE)).await? {
            Some(text) => serde_json::from_str(&text).map_err(|e| {
                RepositoryError::Serialization(format!("{}: {}", LIBRARY_FILE, e))
            })?,
            None => Library::new(),
        };

        let api_key = match read_if_exists(&dir.join(API_KEY_FILE)).await? {
            Some(text) => {
                let file: KeyFile = serde_json::from_str(&text).map_err(|e| {
                    RepositoryError::Serialization(format!("{}: {}", API_KEY_FILE, e))
                })?;
                match ApiKey::new(file.api_key) {
                    Ok(key) => Some(key),
                    Err(e) => {
                        warn!("Ignoring stored API key: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        info!(
            "Opened quiz data in {} ({} topic(s), key {})",
            dir.display(),
            library.topics().len(),
            if api_key.is_some() { "stored" } else { "missing" }
        );

        Ok(Self {
            dir,
            library: Mutex::new(library),
            api_key: Mutex::new(api_key),
            fallback_key: None,
        })
    }

    /// Key to hand out while none is stored (e.g. from an environment variable)
    pub fn with_fallback_key(mut self, key: Option<ApiKey>) -> Self {
        self.fallback_key = key;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    fn library_path(&self) -> PathBuf {
        self.dir.join(LIBRARY_FILE)
    }

    fn api_key_path(&self) -> PathBuf {
        self.dir.join(API_KEY_FILE)
    }

    /// Apply `change` to a copy of the library, persist it, then swap it in.
    async fn mutate<T, F>(&self, change: F) -> Result<T, RepositoryError>
    where
        T: Send,
        F: FnOnce(&mut Library) -> Result<T, DomainError> + Send,
    {
        let mut snapshot = self.library.lock().await;
        let mut draft = snapshot.clone();
        let value = change(&mut draft)?;
        write_json_atomic(&self.library_path(), &draft, false).await?;
        *snapshot = draft;
        Ok(value)
    }

    async fn read<T>(
        &self,
        query: impl FnOnce(&Library) -> Result<T, DomainError> + Send,
    ) -> Result<T, RepositoryError> {
        let snapshot = self.library.lock().await;
        Ok(query(&snapshot)?)
    }
}

async fn read_if_exists(path: &Path) -> Result<Option<String>, RepositoryError> {
    match fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write `value` as pretty JSON to a sibling temp file and rename it into place.
///
/// A `private` file is restricted to its owner before any bytes are written.
async fn write_json_atomic<T: Serialize>(
    path: &Path,
    value: &T,
    private: bool,
) -> Result<(), RepositoryError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");

    let written = match write_tmp(&tmp, json.as_bytes(), private).await {
        Ok(()) => fs::rename(&tmp, path).await.map_err(RepositoryError::from),
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    debug!("Saved {} ({} bytes)", path.display(), json.len());
    Ok(())
}

async fn write_tmp(tmp: &Path, bytes: &[u8], private: bool) -> Result<(), RepositoryError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        if private {
            options.mode(0o600);
        }
    }
    let mut file = options.open(tmp).await?;
    // A leftover temp file keeps its old mode on open
    if private {
        restrict_permissions(tmp).await?;
    }
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<(), RepositoryError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<(), RepositoryError> {
    Ok(())
}

#[async_trait]
impl QuizRepository for JsonQuizRepository {
    async fn list_topics(&self) -> Result<Vec<Topic>, RepositoryError> {
        self.read(|lib| Ok(lib.topics().to_vec())).await
    }

    async fn topic(&self, name: &str) -> Result<Topic, RepositoryError> {
        self.read(|lib| {
            lib.topic(name)
                .cloned()
                .ok_or_else(|| DomainError::TopicNotFound(name.to_string()))
        })
        .await
    }

    async fn add_topic(&self, name: &str) -> Result<(), RepositoryError> {
        self.mutate(|lib| lib.add_topic(name).map(|_| ())).await
    }

    async fn rename_topic(&self, name: &str, new_name: &str) -> Result<(), RepositoryError> {
        self.mutate(|lib| lib.rename_topic(name, new_name)).await
    }

    async fn remove_topic(&self, name: &str) -> Result<(), RepositoryError> {
        self.mutate(|lib| lib.remove_topic(name).map(|_| ())).await
    }

    async fn add_source(&self, topic: &str, draft: SourceDraft) -> Result<(), RepositoryError> {
        self.mutate(|lib| lib.add_source(topic, draft)).await
    }

    async fn update_source(
        &self,
        topic: &str,
        source: &str,
        draft: SourceDraft,
    ) -> Result<(), RepositoryError> {
        self.mutate(|lib| lib.update_source(topic, source, draft))
            .await
    }

    async fn remove_source(&self, topic: &str, source: &str) -> Result<(), RepositoryError> {
        self.mutate(|lib| lib.remove_source(topic, source).map(|_| ()))
            .await
    }

    async fn get_questions(
        &self,
        topic: &str,
        source: &str,
    ) -> Result<Vec<StoredQuestion>, RepositoryError> {
        self.read(|lib| Ok(lib.questions(topic, source)?.to_vec()))
            .await
    }

    async fn add_questions(
        &self,
        topic: &str,
        source: &str,
        questions: Vec<Question>,
    ) -> Result<Vec<Question>, RepositoryError> {
        self.mutate(|lib| lib.add_questions(topic, source, questions))
            .await
    }

    async fn remove_question(
        &self,
        topic: &str,
        source: &str,
        index: usize,
    ) -> Result<(), RepositoryError> {
        self.mutate(|lib| lib.remove_question(topic, source, index).map(|_| ()))
            .await
    }

    async fn mark_served(
        &self,
        topic: &str,
        source: &str,
        questions: &[Question],
    ) -> Result<(), RepositoryError> {
        self.mutate(|lib| lib.mark_served(topic, source, questions))
            .await
    }

    async fn requeue_questions(
        &self,
        topic: &str,
        source: &str,
        questions: &[Question],
    ) -> Result<usize, RepositoryError> {
        self.mutate(|lib| lib.requeue(topic, source, questions))
            .await
    }

    async fn get_api_key(&self) -> Result<Option<ApiKey>, RepositoryError> {
        let stored = self.api_key.lock().await.clone();
        Ok(stored.or_else(|| self.fallback_key.clone()))
    }

    async fn set_api_key(&self, key: &ApiKey) -> Result<(), RepositoryError> {
        let mut current = self.api_key.lock().await;
        write_json_atomic(
            &self.api_key_path(),
            &KeyFile {
                api_key: key.expose().to_string(),
            },
            true,
        )
        .await?;
        *current = Some(key.clone());
        info!("Stored API key {}", key.masked());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(stem: &str) -> Question {
        Question::try_new(
            stem,
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            2,
        )
        .unwrap()
    }

    async fn seeded(dir: &Path) -> JsonQuizRepository {
        let repo = JsonQuizRepository::open(dir).await.unwrap();
        repo.add_topic("Biology").await.unwrap();
        repo.add_source(
            "Biology",
            SourceDraft::new("Cell structure notes", "Cells have membranes.").with_importance(8),
        )
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn test_open_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("nested").join("data");
        let repo = JsonQuizRepository::open(&data).await.unwrap();

        assert!(data.is_dir());
        assert!(repo.list_topics().await.unwrap().is_empty());
        assert!(repo.get_api_key().await.unwrap().is_none());
        assert!(!data.join(LIBRARY_FILE).exists());
    }

    #[tokio::test]
    async fn test_library_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let repo = seeded(dir.path()).await;
            let inserted = repo
                .add_questions(
                    "Biology",
                    "Cell structure notes",
                    vec![question("What holds DNA?"), question("what holds dna")],
                )
                .await
                .unwrap();
            assert_eq!(inserted.len(), 1);
            repo.mark_served("Biology", "Cell structure notes", &inserted)
                .await
                .unwrap();
        }

        let repo = JsonQuizRepository::open(dir.path()).await.unwrap();
        let topic = repo.topic("biology").await.unwrap();
        assert_eq!(topic.sources()[0].importance(), 8);

        let stored = repo
            .get_questions("Biology", "Cell structure notes")
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].served, 1);
        assert_eq!(stored[0].question.correct(), 2);
        assert!(!dir.path().join("library.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_domain_errors_leave_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded(dir.path()).await;
        let before = std::fs::read_to_string(dir.path().join(LIBRARY_FILE)).unwrap();

        let err = repo.add_topic(" biology ").await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Domain(DomainError::DuplicateTopic(_))
        ));
        assert!(repo.topic("Chemistry").await.is_err());

        let after = std::fs::read_to_string(dir.path().join(LIBRARY_FILE)).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let repo = seeded(&data).await;

        // Replace the data directory with a plain file so every write fails
        std::fs::remove_dir_all(&data).unwrap();
        std::fs::write(&data, "not a directory").unwrap();

        let err = repo.add_topic("Chemistry").await.unwrap_err();
        assert!(err.is_storage_failure());

        let topics = repo.list_topics().await.unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].name(), "Biology");
    }

    #[tokio::test]
    async fn test_cascading_removal() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded(dir.path()).await;
        repo.add_questions("Biology", "Cell structure notes", vec![question("Q?")])
            .await
            .unwrap();

        repo.remove_source("Biology", "cell structure notes")
            .await
            .unwrap();
        assert!(repo.topic("Biology").await.unwrap().sources().is_empty());

        repo.remove_topic("Biology").await.unwrap();
        let reopened = JsonQuizRepository::open(dir.path()).await.unwrap();
        assert!(reopened.list_topics().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_remove_question() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded(dir.path()).await;
        repo.add_questions(
            "Biology",
            "Cell structure notes",
            vec![question("One?"), question("Two?")],
        )
        .await
        .unwrap();

        repo.update_source(
            "Biology",
            "Cell structure notes",
            SourceDraft::new("Cell notes", "Updated text").with_link("https://example.org"),
        )
        .await
        .unwrap();
        repo.remove_question("Biology", "Cell notes", 0).await.unwrap();

        let stored = repo.get_questions("Biology", "Cell notes").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].question.stem(), "Two?");
        assert!(repo.remove_question("Biology", "Cell notes", 5).await.is_err());
    }

    #[tokio::test]
    async fn test_api_key_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonQuizRepository::open(dir.path()).await.unwrap();
        repo.set_api_key(&ApiKey::new("gsk_abc123").unwrap())
            .await
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join(API_KEY_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["api_key"], "gsk_abc123");

        let reopened = JsonQuizRepository::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get_api_key().await.unwrap().unwrap().expose(),
            "gsk_abc123"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_api_key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join("api_key.json.tmp");
        std::fs::write(&tmp, "{}").unwrap();
        std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o644)).unwrap();

        let repo = JsonQuizRepository::open(dir.path()).await.unwrap();
        repo.set_api_key(&ApiKey::new("gsk_secret").unwrap())
            .await
            .unwrap();

        let mode = std::fs::metadata(dir.path().join(API_KEY_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!tmp.exists());
    }

    #[tokio::test]
    async fn test_requeue_persists_reset_counts() {
        let dir = tempfile::tempdir().unwrap();
        {
            let repo = seeded(dir.path()).await;
            let questions = vec![question("One?"), question("Two?")];
            repo.add_questions("Biology", "Cell structure notes", questions.clone())
                .await
                .unwrap();
            repo.mark_served("Biology", "Cell structure notes", &questions)
                .await
                .unwrap();
            let queued = repo
                .requeue_questions("Biology", "Cell structure notes", &[question("two")])
                .await
                .unwrap();
            assert_eq!(queued, 1);
        }

        let repo = JsonQuizRepository::open(dir.path()).await.unwrap();
        let stored = repo
            .get_questions("Biology", "Cell structure notes")
            .await
            .unwrap();
        assert_eq!(stored.iter().map(|q| q.served).collect::<Vec<_>>(), vec![1, 0]);
    }

    #[tokio::test]
    async fn test_fallback_key_only_when_nothing_stored() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonQuizRepository::open(dir.path())
            .await
            .unwrap()
            .with_fallback_key(Some(ApiKey::new("from_env").unwrap()));
        assert_eq!(repo.get_api_key().await.unwrap().unwrap().expose(), "from_env");

        repo.set_api_key(&ApiKey::new("stored").unwrap()).await.unwrap();
        assert_eq!(repo.get_api_key().await.unwrap().unwrap().expose(), "stored");
    }

    #[tokio::test]
    async fn test_blank_stored_key_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(API_KEY_FILE), r#"{"api_key": ""}"#).unwrap();
        let repo = JsonQuizRepository::open(dir.path()).await.unwrap();
        assert!(repo.get_api_key().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_library_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LIBRARY_FILE), "{ not json").unwrap();
        let result = JsonQuizRepository::open(dir.path()).await;
        assert!(matches!(result, Err(RepositoryError::Serialization(_))));
    }
}
