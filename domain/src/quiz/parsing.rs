//! Question parsing for AI completions.
//!
//! Extracts structured [`Question`] records from free-form completion text.
//! Pure domain logic: no I/O, just pattern matching. Each block folds to a
//! [`ParseOutcome`]; a malformed block is skipped with a [`SkipReason`] and
//! the rest of the batch is still parsed.
//!
//! # Accepted layout
//!
//! | Element | Examples |
//! |---------|----------|
//! | Header | `### Question 2`, `**Question 2:**`, `Question 2.`, `Q2)`, `Question:` |
//! | Option | `A) text`, `(b) text`, `C. text`, `3) text` |
//! | Answer | `Answer: B`, `Correct answer: (b)`, `Correct: 2`, `Answer: <option text>` |
//! | Inline marker | `D) text (correct)` |

use super::question::{OPTION_COUNT, OPTION_LABELS, Question, label_to_index};
use crate::core::string::collapse_whitespace;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    // A bare `Q3` only counts with trailing punctuation or a heading/bold
    // prefix, so a stem like "Q3 revenue rose" is not split off.
    Regex::new(
        r"(?im)^[ \t]*(?:(?:#{1,6}[ \t]*)?(?:\*\*|__)?[ \t]*(?:question[ \t]*#?[ \t]*\d+[ \t]*[:.)\-]?|question[ \t]*:|q[ \t]*\d+[ \t]*[:.)])|(?:#{1,6}[ \t]*(?:\*\*|__)?|\*\*|__)[ \t]*q[ \t]*\d+[ \t]*-?)[ \t]*(?:\*\*|__)?[ \t]*:?",
    )
    .expect("header pattern is valid")
});

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•+][ \t]+)+").expect("bullet pattern is valid"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}[ \t]*").expect("heading pattern is valid"));

// Emphasis is only stripped when the markers wrap a run of text, so
// `2**3`, `*args` and `__init__` survive cleaning. Underscore pairs must
// wrap several words since `__name__` cannot be told apart otherwise.
static STRONG_STARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^\w*])\*\*([^\s*](?:.*?[^\s*])?)\*\*($|[^\w*])")
        .expect("emphasis pattern is valid")
});

static EM_STAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^\w*])\*([^\s*](?:[^*]*[^\s*])?)\*($|[^\w*])")
        .expect("emphasis pattern is valid")
});

static UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|\W)(?:__|_)([^\s_][^_]*\s[^_]*[^\s_])(?:__|_)($|\W)")
        .expect("emphasis pattern is valid")
});

static OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\()?([A-Da-d1-4])[ \t]*([).:\]])[ \t]*(.*)$").expect("option pattern is valid")
});

static ANSWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:the[ \t]+)?(?:correct[ \t]+answers?|correct[ \t]+option|answer[ \t]+key|answers?|correct)[ \t]*(?:is[ \t]*)?[:=\-][ \t]*(.*)$",
    )
    .expect("answer pattern is valid")
});

static INLINE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[ \t]*(?:[(\[][ \t]*correct(?:[ \t]+answer)?[ \t]*[)\]]|[✓✔])[ \t]*$")
        .expect("inline marker pattern is valid")
});

static OPTIONS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:options|choices|answers)[ \t]*:?$").expect("label pattern is valid")
});

/// Why a block did not produce a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing left of the stem after cleaning
    EmptyStem,
    /// Fewer than four options were found
    TooFewOptions { found: usize },
    /// More than four options were found
    TooManyOptions { found: usize },
    /// The same option label appeared twice
    DuplicateOption { label: char },
    /// No correct-answer marker was recognized
    MissingAnswer,
    /// Several labels, or markers that disagree
    AmbiguousAnswer,
    /// Extracted fields failed question validation
    Invalid(String),
    /// Valid, but beyond the number of questions requested
    Surplus,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyStem => write!(f, "empty question text"),
            SkipReason::TooFewOptions { found } => {
                write!(f, "only {} of {} options", found, OPTION_COUNT)
            }
            SkipReason::TooManyOptions { found } => {
                write!(f, "{} options, expected {}", found, OPTION_COUNT)
            }
            SkipReason::DuplicateOption { label } => write!(f, "option {} repeated", label),
            SkipReason::MissingAnswer => write!(f, "no correct answer marked"),
            SkipReason::AmbiguousAnswer => write!(f, "ambiguous correct answer"),
            SkipReason::Invalid(msg) => write!(f, "{}", msg),
            SkipReason::Surplus => write!(f, "more questions than requested"),
        }
    }
}

/// Result of parsing one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Valid(Question),
    Skipped(SkipReason),
}

/// A block that was dropped, with its 1-based position in the completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    pub block: usize,
    pub reason: SkipReason,
}

/// Everything extracted from one completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub questions: Vec<Question>,
    pub skipped: Vec<SkippedBlock>,
    pub expected: usize,
}

impl ParseReport {
    /// Fewer questions than requested were extracted.
    pub fn is_partial(&self) -> bool {
        self.questions.len() < self.expected
    }

    pub fn shortfall(&self) -> usize {
        self.expected.saturating_sub(self.questions.len())
    }
}

/// Parse up to `expected` questions out of a raw completion.
///
/// Never fails: blocks that cannot be turned into a valid question are
/// reported in [`ParseReport::skipped`].
pub fn parse_questions(raw: &str, expected: usize) -> ParseReport {
    let mut report = ParseReport {
        expected,
        ..Default::default()
    };

    for (i, block) in split_blocks(raw).into_iter().enumerate() {
        let outcome = match parse_block(block) {
            ParseOutcome::Valid(_) if report.questions.len() >= expected => {
                ParseOutcome::Skipped(SkipReason::Surplus)
            }
            outcome => outcome,
        };
        match outcome {
            ParseOutcome::Valid(question) => report.questions.push(question),
            ParseOutcome::Skipped(reason) => report.skipped.push(SkippedBlock {
                block: i + 1,
                reason,
            }),
        }
    }

    report
}

/// Split a completion into per-question blocks.
///
/// Text before the first header is preamble and is dropped. Without any
/// header the whole text is treated as a single block.
fn split_blocks(raw: &str) -> Vec<&str> {
    let headers: Vec<_> = HEADER.find_iter(raw).collect();
    if headers.is_empty() {
        return if raw.trim().is_empty() {
            Vec::new()
        } else {
            vec![raw]
        };
    }

    headers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = headers.get(i + 1).map_or(raw.len(), |next| next.start());
            &raw[m.end()..end]
        })
        .collect()
}

/// Strip markdown noise from a single line until it stops changing.
fn clean_line(line: &str) -> String {
    let mut current = collapse_whitespace(line);
    // Each pass can only shorten the line, so this terminates quickly
    for _ in 0..4 {
        let mut next = current.replace('`', "");
        next = HEADING.replace(&next, "").into_owned();
        next = BULLET.replace(&next, "").into_owned();
        next = STRONG_STARS.replace_all(&next, "$1$2$3").into_owned();
        next = EM_STAR.replace_all(&next, "$1$2$3").into_owned();
        next = UNDERSCORES.replace_all(&next, "$1$2$3").into_owned();
        next = collapse_whitespace(&next);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// A cleaned line of a block
enum Line {
    Answer(String),
    Option {
        index: usize,
        text: String,
        marked: bool,
        /// `A.` or lowercase label without parentheses; may be prose
        loose: bool,
        raw: String,
    },
    Text(String),
}

fn classify(line: String) -> Line {
    if let Some(caps) = ANSWER.captures(&line) {
        return Line::Answer(caps[1].trim().to_string());
    }

    if let Some(caps) = OPTION.captures(&line)
        && let Some(label) = caps[2].chars().next()
        && let Some(index) = label_to_index(label)
    {
        let loose = caps.get(1).is_none() && (&caps[3] == "." || label.is_ascii_lowercase());
        let mut text = caps[4].to_string();
        let marked = match INLINE_MARKER.find(&text) {
            Some(marker) => {
                text.truncate(marker.start());
                true
            }
            None => false,
        };
        return Line::Option {
            index,
            text: text.trim().to_string(),
            marked,
            loose,
            raw: line,
        };
    }

    Line::Text(line)
}

/// Turn a loose leading "option" back into stem text when the block has
/// too many options or its label repeats, as in a stem starting
/// "A. Einstein proposed".
fn demote_leading_prose(lines: &mut [Line]) {
    loop {
        let options: Vec<usize> = lines
            .iter()
            .filter_map(|l| match l {
                Line::Option { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        let Some(first) = lines.iter().position(|l| matches!(l, Line::Option { .. })) else {
            return;
        };
        let raw = match &lines[first] {
            Line::Option {
                index, loose, raw, ..
            } if *loose && (options.len() > OPTION_COUNT || options[1..].contains(index)) => {
                raw.clone()
            }
            _ => return,
        };
        lines[first] = Line::Text(raw);
    }
}

/// Parse one block into a question or a skip reason.
pub fn parse_block(block: &str) -> ParseOutcome {
    let mut lines: Vec<Line> = block
        .lines()
        .map(clean_line)
        .filter(|l| !l.is_empty())
        .map(classify)
        .collect();
    demote_leading_prose(&mut lines);

    let mut stem_lines: Vec<String> = Vec::new();
    let mut options: Vec<(usize, String)> = Vec::new();
    let mut answers: Vec<String> = Vec::new();
    let mut inline_marked: BTreeSet<usize> = BTreeSet::new();

    for line in lines {
        match line {
            Line::Answer(payload) => answers.push(payload),
            Line::Option {
                index,
                text,
                marked,
                ..
            } => {
                if marked {
                    inline_marked.insert(index);
                }
                options.push((index, text));
            }
            Line::Text(text) => {
                if options.is_empty() && !OPTIONS_LABEL.is_match(&text) {
                    stem_lines.push(text);
                }
            }
        }
    }

    let stem = stem_lines.join(" ");
    if stem.trim().is_empty() {
        return ParseOutcome::Skipped(SkipReason::EmptyStem);
    }

    if options.len() > OPTION_COUNT {
        return ParseOutcome::Skipped(SkipReason::TooManyOptions {
            found: options.len(),
        });
    }
    let mut labels = BTreeSet::new();
    for (index, _) in &options {
        if !labels.insert(*index) {
            return ParseOutcome::Skipped(SkipReason::DuplicateOption {
                label: OPTION_LABELS[*index],
            });
        }
    }
    if options.len() < OPTION_COUNT {
        return ParseOutcome::Skipped(SkipReason::TooFewOptions {
            found: options.len(),
        });
    }
    options.sort_by_key(|(index, _)| *index);
    let options: Vec<String> = options.into_iter().map(|(_, text)| text).collect();

    let correct = match resolve_answer(&answers, &inline_marked, &options) {
        Ok(index) => index,
        Err(reason) => return ParseOutcome::Skipped(reason),
    };

    match Question::try_new(stem, options, correct) {
        Ok(question) => ParseOutcome::Valid(question),
        Err(e) => ParseOutcome::Skipped(SkipReason::Invalid(e.to_string())),
    }
}

/// Combine answer lines and inline markers into a single index.
fn resolve_answer(
    answers: &[String],
    inline_marked: &BTreeSet<usize>,
    options: &[String],
) -> Result<usize, SkipReason> {
    let mut candidates = inline_marked.clone();
    for payload in answers {
        match parse_answer_payload(payload, options) {
            AnswerPayload::Single(index) => {
                candidates.insert(index);
            }
            AnswerPayload::Multiple => return Err(SkipReason::AmbiguousAnswer),
            AnswerPayload::Unrecognized => {}
        }
    }

    let mut iter = candidates.into_iter();
    match (iter.next(), iter.next()) {
        (Some(index), None) => Ok(index),
        (Some(_), Some(_)) => Err(SkipReason::AmbiguousAnswer),
        (None, _) => Err(SkipReason::MissingAnswer),
    }
}

enum AnswerPayload {
    Single(usize),
    Multiple,
    Unrecognized,
}

fn parse_answer_payload(payload: &str, options: &[String]) -> AnswerPayload {
    if let Some((index, tail)) = leading_label(payload) {
        let tail = tail.trim_start();
        let joined = tail
            .strip_prefix([',', ';', '/', '&'])
            .or_else(|| strip_word(tail, "and"))
            .or_else(|| strip_word(tail, "or"));
        if let Some(rest) = joined
            && leading_label(rest).is_some()
        {
            return AnswerPayload::Multiple;
        }
        return AnswerPayload::Single(index);
    }

    // "Answer: Nucleus" - match the option text itself
    let wanted = payload
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_lowercase();
    let matches: Vec<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, option)| option.to_lowercase() == wanted)
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [index] => AnswerPayload::Single(*index),
        [] => AnswerPayload::Unrecognized,
        _ => AnswerPayload::Multiple,
    }
}

fn strip_word<'a>(s: &'a str, word: &str) -> Option<&'a str> {
    let head = s.get(..word.len())?;
    let rest = &s[word.len()..];
    (head.eq_ignore_ascii_case(word) && rest.starts_with(char::is_whitespace)).then_some(rest)
}

/// Read an option label at the start of an answer payload.
///
/// Lowercase letters only count when followed by punctuation or the end, so
/// "a cell wall" is not read as option A.
fn leading_label(payload: &str) -> Option<(usize, &str)> {
    let s = payload.trim_start();
    let (s, parenthesized) = match s.strip_prefix('(') {
        Some(rest) => (rest, true),
        None => (s, false),
    };

    let mut chars = s.chars();
    let label = chars.next()?;
    let index = label_to_index(label)?;
    let mut rest = chars.as_str();
    if parenthesized {
        rest = rest.strip_prefix(')')?;
    }

    let accepted = match rest.chars().next() {
        None => true,
        Some(')' | '.' | ':') => true,
        Some(c) if c.is_whitespace() || matches!(c, ',' | ';' | '/' | '&') => {
            parenthesized || !label.is_ascii_lowercase()
        }
        Some(_) => false,
    };

    accepted.then(|| (index, rest.trim_start_matches([')', '.', ':'])))
}
