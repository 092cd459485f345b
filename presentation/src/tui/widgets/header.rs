//! Header widget: screen, model, key status and generation phase

use crate::tui::state::TuiState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct HeaderWidget<'a> {
    state: &'a TuiState,
}

impl<'a> HeaderWidget<'a> {
    pub fn new(state: &'a TuiState) -> Self {
        Self { state }
    }
}

impl<'a> Widget for HeaderWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (key_text, key_color) = if self.state.has_key {
            ("key set", Color::Green)
        } else {
            ("no API key (K)", Color::Red)
        };

        let phase_text = match self.state.generation {
            Some(state) => state.label(),
            None if self.state.validating => "Checking key",
            None => "Ready",
        };

        let line = Line::from(vec![
            Span::styled("◉ ", Style::default().fg(Color::Green)),
            Span::styled(
                self.state.screen.title(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled(&self.state.model_name, Style::default().fg(Color::White)),
            Span::raw(" | "),
            Span::styled(key_text, Style::default().fg(key_color)),
            Span::raw(" | "),
            Span::styled(phase_text, Style::default().fg(Color::Yellow)),
        ]);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" AI Quiz ")
            .style(Style::default().fg(Color::White));

        Paragraph::new(line).block(block).render(area, buf);
    }
}
