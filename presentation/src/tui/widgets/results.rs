//! Results screen: score and per-question review

use crate::tui::state::TuiState;
use quiz_domain::OPTION_LABELS;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct ResultsWidget<'a> {
    state: &'a TuiState,
}

impl<'a> ResultsWidget<'a> {
    pub fn new(state: &'a TuiState) -> Self {
        Self { state }
    }
}

impl<'a> Widget for ResultsWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Score: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    self.state.score_text(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
        ];

        let results = self
            .state
            .session
            .as_ref()
            .map(|s| s.results())
            .unwrap_or_default();

        for (i, result) in results.iter().enumerate() {
            let (mark, color) = if result.correct {
                ("✓", Color::Green)
            } else {
                ("✗", Color::Red)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", mark), Style::default().fg(color)),
                Span::raw(format!("{}. {}", i + 1, result.question.stem())),
            ]));

            let chosen = result
                .chosen
                .and_then(|c| OPTION_LABELS.get(c))
                .map_or_else(|| "-".to_string(), |l| l.to_string());
            lines.push(Line::from(Span::styled(
                format!(
                    "    your answer: {}   correct: {}) {}",
                    chosen,
                    result.question.correct_label(),
                    result.question.correct_option()
                ),
                Style::default().fg(Color::DarkGray),
            )));
        }

        if let Some(note) = &self.state.review_note {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                note.clone(),
                Style::default().fg(Color::Yellow),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: another round   Esc: topics   q: quit",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Results ")
                    .style(Style::default().fg(Color::White)),
            )
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
