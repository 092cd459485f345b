//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use quiz_domain::GenerationMode;
use std::path::PathBuf;

/// How `generate` fills a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Serve stored questions first, generate only the shortfall
    Reuse,
    /// Serve never-served stored questions if enough exist, else ask the AI
    Generate,
}

impl From<ModeArg> for GenerationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Reuse => GenerationMode::Reuse,
            ModeArg::Generate => GenerationMode::Generate,
        }
    }
}

/// CLI arguments for ai-quiz
#[derive(Parser, Debug)]
#[command(name = "ai-quiz")]
#[command(author, version, about = "Multiple-choice quizzes generated from your own notes")]
#[command(long_about = r#"
ai-quiz keeps a library of topics and sources (your notes) and asks an
OpenAI-compatible completion endpoint to write multiple-choice questions
about them. Generated questions are stored and reused before new ones
are requested.

Configuration files are loaded from (in priority order):
1. --config <path>       Explicit config file
2. AI_QUIZ_<SECTION>__<KEY> environment variables
3. ./quiz.toml           Project-level config
4. ~/.config/ai-quiz/config.toml   Global config

Example:
  ai-quiz topic add Biology
  ai-quiz source add Biology "Cell structure notes" --content "Cells have a membrane..."
  ai-quiz generate Biology -n 3
  ai-quiz
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// The subcommand to run; no subcommand starts the terminal UI.
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Tui)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Interactive quiz (default)
    Tui,

    /// Manage topics
    #[command(subcommand)]
    Topic(TopicCommand),

    /// Manage the sources of a topic
    #[command(subcommand)]
    Source(SourceCommand),

    /// Print questions for a topic
    Generate(GenerateArgs),

    /// Inspect or prune stored questions
    #[command(subcommand)]
    Question(QuestionCommand),

    /// Manage the API key
    #[command(subcommand)]
    Key(KeyCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum TopicCommand {
    /// List topics with their source and question counts
    List,
    /// Add a topic
    Add { name: String },
    /// Rename a topic, keeping its sources and questions
    Rename { name: String, new_name: String },
    /// Remove a topic with all of its sources and questions
    Remove { name: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SourceCommand {
    /// List the sources of a topic
    List { topic: String },
    /// Add a source to a topic
    Add(SourceArgs),
    /// Replace a source's details; stored questions are kept
    Update(SourceArgs),
    /// Remove a source with its questions
    Remove { topic: String, name: String },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SourceArgs {
    pub topic: String,
    pub name: String,

    /// Text the questions are written from
    #[arg(long)]
    pub content: String,

    /// Where the material came from
    #[arg(long)]
    pub link: Option<String>,

    /// Weight for random source picks (0-10, default 5)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub importance: Option<u8>,

    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum QuestionCommand {
    /// List the stored questions of a source with their served counts
    List { topic: String, source: String },
    /// Remove a stored question by its number in `question list`
    Remove {
        topic: String,
        source: String,
        number: usize,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct GenerateArgs {
    pub topic: String,

    /// Source to draw from (default: weighted random pick)
    #[arg(long, short)]
    pub source: Option<String>,

    /// Number of questions (default from config)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Reuse stored questions, or serve only unseen ones
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Print the questions as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum KeyCommand {
    /// Validate a key against the endpoint and store it
    Set { key: String },
    /// Show the stored key, masked
    Show,
}
