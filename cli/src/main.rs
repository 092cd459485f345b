//! CLI entrypoint for ai-quiz
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use quiz_application::{
    CompletionGateway, GenerateQuestionsUseCase, GenerationProgress, KeyStatus, NoProgress,
    QuizBehavior, QuizRepository, ValidateApiKeyUseCase,
};
use quiz_domain::{ApiKey, ConfigIssue, GenerationRequest, SourceDraft};
use quiz_infrastructure::{ChatCompletionConfig, ChatCompletionGateway, ConfigLoader, JsonQuizRepository};
use quiz_presentation::{
    Cli, Command, ConsoleFormatter, GenerateArgs, KeyCommand, ProgressReporter, QuestionCommand,
    SimpleProgress, SourceArgs, SourceCommand, TopicCommand, TuiApp,
};
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };

    let issues = config.validate();
    if !issues.is_empty() {
        eprintln!("{}", ConsoleFormatter::format_issues(&issues));
    }
    if ConfigIssue::has_errors(&issues) {
        bail!("configuration has errors, see above");
    }
    ConsoleFormatter::set_color(config.output.color);

    let data_dir = config.storage.resolve_data_dir();
    let command = cli.command().clone();
    let _guard = init_logging(cli.verbose, &command, &data_dir)?;

    info!("Starting ai-quiz {}", env!("CARGO_PKG_VERSION"));

    // === Dependency Injection ===
    let gateway = Arc::new(ChatCompletionGateway::new(ChatCompletionConfig::from_file(
        &config.provider,
    ))?);
    let repository = Arc::new(
        JsonQuizRepository::open(&data_dir)
            .await
            .with_context(|| format!("failed to open data directory {}", data_dir.display()))?
            .with_fallback_key(env_key(&config.provider.api_key_env)),
    );
    let behavior = config.quiz.to_behavior();

    match command {
        Command::Tui => {
            let mut app =
                TuiApp::new(gateway, repository, behavior).with_model_name(&config.provider.model);
            app.run().await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Topic(cmd) => run_topic(repository.as_ref(), cmd).await,
        Command::Source(cmd) => run_source(repository.as_ref(), cmd).await,
        Command::Question(cmd) => run_question(repository.as_ref(), cmd).await,
        Command::Generate(args) => {
            run_generate(gateway, repository, &behavior, args, cli.quiet).await
        }
        Command::Key(cmd) => run_key(gateway, repository.as_ref(), cmd).await,
    }
}

/// Subcommands log to stderr; the TUI owns the terminal, so it logs to a
/// daily file under `<data_dir>/logs`. Keep the returned guard alive until
/// exit so buffered lines are flushed.
fn init_logging(verbose: u8, command: &Command, data_dir: &Path) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    if *command == Command::Tui {
        let log_dir = data_dir.join("logs");
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
        let appender = tracing_appender::rolling::daily(&log_dir, "ai-quiz.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        Ok(None)
    }
}

/// Key from the configured environment variable, used when none is stored
fn env_key(var: &str) -> Option<ApiKey> {
    if var.trim().is_empty() {
        return None;
    }
    std::env::var(var).ok().and_then(|value| ApiKey::new(value).ok())
}

async fn run_topic<R: QuizRepository>(repository: &R, cmd: TopicCommand) -> Result<ExitCode> {
    match cmd {
        TopicCommand::List => {
            let topics = repository.list_topics().await?;
            print!("{}", ConsoleFormatter::format_topics(&topics));
        }
        TopicCommand::Add { name } => {
            repository.add_topic(&name).await?;
            println!("Added topic '{}'", name.trim());
        }
        TopicCommand::Rename { name, new_name } => {
            repository.rename_topic(&name, &new_name).await?;
            println!("Renamed topic '{}' to '{}'", name.trim(), new_name.trim());
        }
        TopicCommand::Remove { name } => {
            repository.remove_topic(&name).await?;
            println!("Removed topic '{}' with its sources and questions", name.trim());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn source_draft(args: SourceArgs) -> (String, SourceDraft) {
    let draft = SourceDraft {
        name: args.name,
        content: args.content,
        link: args.link,
        importance: args.importance,
        comment: args.comment,
    };
    (args.topic, draft)
}

async fn run_source<R: QuizRepository>(repository: &R, cmd: SourceCommand) -> Result<ExitCode> {
    match cmd {
        SourceCommand::List { topic } => {
            let topic = repository.topic(&topic).await?;
            print!("{}", ConsoleFormatter::format_sources(&topic));
        }
        SourceCommand::Add(args) => {
            let (topic, draft) = source_draft(args);
            let name = draft.name.trim().to_string();
            repository.add_source(&topic, draft).await?;
            println!("Added source '{}' to '{}'", name, topic.trim());
        }
        SourceCommand::Update(args) => {
            let (topic, draft) = source_draft(args);
            let name = draft.name.clone();
            repository.update_source(&topic, &name, draft).await?;
            println!("Updated source '{}' in '{}'", name.trim(), topic.trim());
        }
        SourceCommand::Remove { topic, name } => {
            repository.remove_source(&topic, &name).await?;
            println!("Removed source '{}' with its questions", name.trim());
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_question<R: QuizRepository>(
    repository: &R,
    cmd: QuestionCommand,
) -> Result<ExitCode> {
    match cmd {
        QuestionCommand::List { topic, source } => {
            let questions = repository.get_questions(&topic, &source).await?;
            print!("{}", ConsoleFormatter::format_stored(&questions));
        }
        QuestionCommand::Remove {
            topic,
            source,
            number,
        } => {
            let Some(index) = number.checked_sub(1) else {
                bail!("question numbers start at 1");
            };
            repository.remove_question(&topic, &source, index).await?;
            println!("Removed question {} from '{}'", number, source.trim());
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_generate<G: CompletionGateway + 'static, R: QuizRepository + 'static>(
    gateway: Arc<G>,
    repository: Arc<R>,
    behavior: &QuizBehavior,
    args: GenerateArgs,
    quiet: bool,
) -> Result<ExitCode> {
    let mode = args.mode.map(Into::into).unwrap_or(behavior.default_mode);
    let count = args.count.unwrap_or(behavior.default_count);
    let mut request = GenerationRequest::new(args.topic, count).with_mode(mode);
    if let Some(source) = args.source {
        request = request.with_source(source);
    }

    let use_case = GenerateQuestionsUseCase::new(gateway, repository)
        .with_priorities(behavior.use_priorities);

    // Execute with or without progress reporting
    let progress: Box<dyn GenerationProgress> = if quiet || args.json {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    match use_case
        .execute_with_progress(request, progress.as_ref())
        .await
    {
        Ok(output) => {
            if args.json {
                println!("{}", ConsoleFormatter::format_json(&output));
            } else {
                print!("{}", ConsoleFormatter::format_output(&output));
            }
            // Nothing usable came back
            Ok(if output.questions.is_empty() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Err(e) => {
            eprintln!("{}", ConsoleFormatter::format_error(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_key<G: CompletionGateway + 'static, R: QuizRepository>(
    gateway: Arc<G>,
    repository: &R,
    cmd: KeyCommand,
) -> Result<ExitCode> {
    match cmd {
        KeyCommand::Set { key } => {
            let key = ApiKey::new(key)?;
            let (tx, mut rx) = mpsc::unbounded_channel();
            ValidateApiKeyUseCase::new(gateway).spawn(key, tx);

            let event = rx
                .recv()
                .await
                .context("key validation ended without a result")?;
            if event.status == KeyStatus::Valid {
                repository.set_api_key(&event.key).await?;
            }
            println!("{}", ConsoleFormatter::format_key_status(event.status));

            Ok(if event.status == KeyStatus::Valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        KeyCommand::Show => {
            match repository.get_api_key().await? {
                Some(key) => println!("{}", key.masked()),
                None => println!("No API key stored. Set one with `ai-quiz key set <KEY>`."),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
