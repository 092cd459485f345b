//! Topic and source pickers

use crate::tui::state::TuiState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

fn row<'a>(selected: bool, label: String, detail: String) -> Line<'a> {
    let marker = if selected { "▶ " } else { "  " };
    let label_style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::styled(label, label_style),
        Span::raw("  "),
        Span::styled(detail, Style::default().fg(Color::DarkGray)),
    ])
}

/// Lines scrolled so that `cursor` stays visible in `height` rows
fn visible(lines: Vec<Line<'_>>, cursor: usize, height: u16) -> Vec<Line<'_>> {
    let height = height.max(1) as usize;
    let skip = (cursor + 1).saturating_sub(height);
    lines.into_iter().skip(skip).collect()
}

pub struct TopicsWidget<'a> {
    state: &'a TuiState,
}

impl<'a> TopicsWidget<'a> {
    pub fn new(state: &'a TuiState) -> Self {
        Self { state }
    }
}

impl<'a> Widget for TopicsWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Topics ")
            .style(Style::default().fg(Color::White));

        let lines = if self.state.topics.is_empty() {
            vec![
                Line::from(Span::styled(
                    "No topics yet.",
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::styled(
                    "Add one with: ai-quiz topic add <NAME>",
                    Style::default().fg(Color::DarkGray),
                )),
            ]
        } else {
            let rows = self
                .state
                .topics
                .iter()
                .enumerate()
                .map(|(i, topic)| {
                    row(
                        i == self.state.topic_cursor,
                        topic.name().to_string(),
                        format!(
                            "{} sources, {} questions",
                            topic.sources().len(),
                            topic.question_count()
                        ),
                    )
                })
                .collect();
            visible(rows, self.state.topic_cursor, block.inner(area).height)
        };

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct SourcesWidget<'a> {
    state: &'a TuiState,
}

impl<'a> SourcesWidget<'a> {
    pub fn new(state: &'a TuiState) -> Self {
        Self { state }
    }
}

impl<'a> Widget for SourcesWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.state.selected_topic() {
            Some(topic) => format!(" Sources of {} ", topic.name()),
            None => " Sources ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().fg(Color::White));

        let cursor = self.state.source_cursor;
        let mut rows = vec![row(
            cursor == 0,
            "Any source".to_string(),
            "picked at random, weighted by importance".to_string(),
        )];
        if let Some(topic) = self.state.selected_topic() {
            rows.extend(topic.sources().iter().enumerate().map(|(i, source)| {
                row(
                    cursor == i + 1,
                    source.name().to_string(),
                    format!(
                        "importance {}, {} questions",
                        source.importance(),
                        source.questions().len()
                    ),
                )
            }));
        }

        let lines = visible(rows, cursor, block.inner(area).height);
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
