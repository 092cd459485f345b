//! Console output formatter for library listings and generated questions

use colored::Colorize;
use quiz_application::{GenerateError, GenerationOutput, KeyStatus};
use quiz_domain::{ConfigIssue, OPTION_LABELS, Question, Severity, StoredQuestion, Topic};
use serde::Serialize;

/// Formats command results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Disable ANSI colors for everything formatted afterwards
    pub fn set_color(enabled: bool) {
        if !enabled {
            colored::control::set_override(false);
        }
    }

    /// Topic names with source and question counts
    pub fn format_topics(topics: &[Topic]) -> String {
        if topics.is_empty() {
            return format!(
                "{}\n",
                "No topics yet. Add one with `ai-quiz topic add <NAME>`.".dimmed()
            );
        }

        let mut output = Self::section_header("Topics");
        for topic in topics {
            output.push_str(&format!(
                "  {}  {}\n",
                topic.name().bold(),
                format!(
                    "({} sources, {} questions)",
                    topic.sources().len(),
                    topic.question_count()
                )
                .dimmed()
            ));
        }
        output
    }

    /// Sources of one topic with importance and stored question counts
    pub fn format_sources(topic: &Topic) -> String {
        let mut output = Self::section_header(&format!("Sources of {}", topic.name()));
        if topic.sources().is_empty() {
            output.push_str(&format!(
                "  {}\n",
                "No sources. Add one with `ai-quiz source add`.".dimmed()
            ));
            return output;
        }

        for source in topic.sources() {
            output.push_str(&format!(
                "  {} {} {}\n",
                source.name().bold(),
                format!("[importance {}]", source.importance()).cyan(),
                format!("{} questions", source.questions().len()).dimmed()
            ));
            if let Some(link) = source.link() {
                output.push_str(&format!("      {} {}\n", "link:".dimmed(), link));
            }
            if let Some(comment) = source.comment() {
                output.push_str(&format!("      {} {}\n", "note:".dimmed(), comment));
            }
        }
        output
    }

    /// Stored questions numbered from 1, with served counts
    pub fn format_stored(questions: &[StoredQuestion]) -> String {
        if questions.is_empty() {
            return format!("{}\n", "No stored questions.".dimmed());
        }

        let mut output = String::new();
        for (i, stored) in questions.iter().enumerate() {
            output.push_str(&format!(
                "{} {} {}\n",
                format!("{:>3}.", i + 1).cyan(),
                stored.question.stem(),
                format!(
                    "(served {}x, added {})",
                    stored.served,
                    stored.created_at.format("%Y-%m-%d")
                )
                .dimmed()
            ));
        }
        output
    }

    /// Generated questions with answers, followed by a delivery summary
    pub fn format_output(output: &GenerationOutput) -> String {
        let mut text = Self::header(&format!("{} / {}", output.topic, output.source));
        text.push('\n');

        for (i, question) in output.questions.iter().enumerate() {
            text.push('\n');
            text.push_str(&Self::format_question(i + 1, question));
        }

        text.push_str(&format!(
            "\n{} {} delivered ({} reused, {} generated)\n",
            "Summary:".cyan().bold(),
            output.questions.len(),
            output.reused,
            output.generated
        ));

        if output.is_partial() {
            text.push_str(&format!(
                "{}\n",
                format!(
                    "Only {} of {} requested questions could be produced.",
                    output.questions.len(),
                    output.requested
                )
                .yellow()
            ));
        }

        for skipped in &output.skipped {
            text.push_str(&format!(
                "  {}\n",
                format!("skipped block {}: {}", skipped.block, skipped.reason).dimmed()
            ));
        }

        if let Some(warning) = &output.storage_warning {
            text.push_str(&format!(
                "{} {}\n",
                "Warning:".yellow().bold(),
                format!("new questions were not saved ({})", warning).yellow()
            ));
        }

        text
    }

    /// One question with its options; the correct option is highlighted
    pub fn format_question(number: usize, question: &Question) -> String {
        let mut text = format!("{} {}\n", format!("{}.", number).bold(), question.stem());
        for (i, (label, option)) in OPTION_LABELS.iter().zip(question.options()).enumerate() {
            if question.is_correct(i) {
                text.push_str(&format!("   {}\n", format!("{}) {}", label, option).green()));
            } else {
                text.push_str(&format!("   {}) {}\n", label, option));
            }
        }
        text.push_str(&format!(
            "   {}\n",
            format!("Answer: {}", question.correct_label()).dimmed()
        ));
        text
    }

    /// Format as JSON
    pub fn format_json(output: &GenerationOutput) -> String {
        serde_json::to_string_pretty(&OutputView::from(output)).unwrap_or_else(|_| "{}".to_string())
    }

    /// Config issues, one per line
    pub fn format_issues(issues: &[ConfigIssue]) -> String {
        issues
            .iter()
            .map(|issue| match issue.severity {
                Severity::Error => format!("{} {}", "config error:".red().bold(), issue.message),
                Severity::Warning => {
                    format!("{} {}", "config warning:".yellow().bold(), issue.message)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_key_status(status: KeyStatus) -> String {
        match status {
            KeyStatus::Valid => format!("{}", "API key is valid and has been saved.".green()),
            KeyStatus::Invalid => format!(
                "{}",
                "The endpoint rejected this API key. It was not saved.".red()
            ),
            KeyStatus::NetworkError => format!(
                "{}",
                "Could not reach the endpoint to check the key. It was not saved.".yellow()
            ),
        }
    }

    /// Error line plus a hint on what to do next
    pub fn format_error(error: &GenerateError) -> String {
        let mut text = format!("{} {}", "Error:".red().bold(), error);
        if error.needs_new_key() {
            text.push_str(&format!(
                "\n{}",
                "Set a key with `ai-quiz key set <KEY>`.".dimmed()
            ));
        } else if error.is_retryable() {
            text.push_str(&format!(
                "\n{}",
                "Check your connection and try again.".dimmed()
            ));
        }
        text
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }
}

/// JSON shape of a delivery
#[derive(Serialize)]
struct OutputView<'a> {
    topic: &'a str,
    source: &'a str,
    requested: usize,
    reused: usize,
    generated: usize,
    questions: Vec<QuestionView<'a>>,
    skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage_warning: Option<&'a str>,
}

#[derive(Serialize)]
struct QuestionView<'a> {
    stem: &'a str,
    options: &'a [String],
    correct: usize,
    answer: char,
}

impl<'a> From<&'a GenerationOutput> for OutputView<'a> {
    fn from(output: &'a GenerationOutput) -> Self {
        Self {
            topic: &output.topic,
            source: &output.source,
            requested: output.requested,
            reused: output.reused,
            generated: output.generated,
            questions: output
                .questions
                .iter()
                .map(|q| QuestionView {
                    stem: q.stem(),
                    options: q.options(),
                    correct: q.correct(),
                    answer: q.correct_label(),
                })
                .collect(),
            skipped: output
                .skipped
                .iter()
                .map(|s| format!("block {}: {}", s.block, s.reason))
                .collect(),
            storage_warning: output.storage_warning.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_domain::{SkipReason, SkippedBlock};

    fn question(stem: &str) -> Question {
        Question::try_new(
            stem,
            vec!["Nucleus".into(), "Membrane".into(), "Wall".into(), "Ribosome".into()],
            1,
        )
        .unwrap()
    }

    fn output() -> GenerationOutput {
        GenerationOutput {
            topic: "Biology".into(),
            source: "Cell structure notes".into(),
            questions: vec![question("What surrounds a cell?")],
            reused: 0,
            generated: 1,
            requested: 2,
            skipped: vec![SkippedBlock {
                block: 2,
                reason: SkipReason::MissingAnswer,
            }],
            storage_warning: None,
        }
    }

    #[test]
    fn test_format_json_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&output())).unwrap();
        assert_eq!(json["topic"], "Biology");
        assert_eq!(json["requested"], 2);
        assert_eq!(json["questions"][0]["answer"], "B");
        assert_eq!(json["questions"][0]["options"].as_array().unwrap().len(), 4);
        assert_eq!(json["skipped"][0], "block 2: no correct answer marked");
        assert!(json.get("storage_warning").is_none());
    }

    #[test]
    fn test_format_output_mentions_shortfall_and_skips() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_output(&output());
        assert!(text.contains("1. What surrounds a cell?"));
        assert!(text.contains("B) Membrane"));
        assert!(text.contains("Answer: B"));
        assert!(text.contains("Only 1 of 2 requested"));
        assert!(text.contains("skipped block 2"));
    }

    #[test]
    fn test_format_error_hints() {
        colored::control::set_override(false);
        let auth = ConsoleFormatter::format_error(&GenerateError::Auth("HTTP 401".into()));
        assert!(auth.contains("key set"));
        let network = ConsoleFormatter::format_error(&GenerateError::Network("timeout".into()));
        assert!(network.contains("try again"));
        let service = ConsoleFormatter::format_error(&GenerateError::Service("HTTP 500".into()));
        assert!(!service.contains("try again"));
    }

    #[test]
    fn test_empty_topics_hint() {
        colored::control::set_override(false);
        assert!(ConsoleFormatter::format_topics(&[]).contains("topic add"));
    }
}
