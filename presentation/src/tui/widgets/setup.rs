//! Quiz setup: count, mode and generation progress

use crate::tui::state::TuiState;
use quiz_domain::GenerationMode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct SetupWidget<'a> {
    state: &'a TuiState,
}

impl<'a> SetupWidget<'a> {
    pub fn new(state: &'a TuiState) -> Self {
        Self { state }
    }
}

fn field<'a>(name: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<10}", name), Style::default().fg(Color::White)),
        Span::styled(value, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ])
}

impl<'a> Widget for SetupWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let topic = state
            .selected_topic()
            .map(|t| t.name().to_string())
            .unwrap_or_default();
        let source = state
            .selected_source()
            .map(|s| s.name().to_string())
            .unwrap_or_else(|| "any (weighted pick)".to_string());
        let mode = match state.generation_mode {
            GenerationMode::Reuse => "reuse stored questions first",
            GenerationMode::Generate => "unseen questions, new if too few",
        };

        let mut lines = vec![
            field("Topic", topic),
            field("Source", source),
            field("Questions", state.count.to_string()),
            field("Mode", mode.to_string()),
            Line::from(""),
        ];

        match state.generation {
            Some(phase) => {
                lines.push(Line::from(Span::styled(
                    format!("⟳ {}...", phase.label()),
                    Style::default().fg(Color::Yellow),
                )));
                if state.skipped_blocks > 0 {
                    lines.push(Line::from(Span::styled(
                        format!("{} malformed block(s) skipped", state.skipped_blocks),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
            None => lines.push(Line::from(Span::styled(
                "Enter: start   +/-: questions   m: mode   Esc: back",
                Style::default().fg(Color::DarkGray),
            ))),
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" New quiz ")
                    .style(Style::default().fg(Color::White)),
            )
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
