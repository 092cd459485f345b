//! Help overlay widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

const SHORTCUTS: &[(&str, &str)] = &[
    ("j/k ↑/↓", "Move selection"),
    ("Enter", "Open, start quiz, next round"),
    ("Esc", "Back"),
    ("a-d 1-4", "Answer the current question"),
    ("+/-", "More or fewer questions"),
    ("m", "Toggle reuse / generate"),
    ("K", "Enter an API key"),
    ("r", "Reload topics from disk"),
    ("?", "Toggle this help"),
    ("q Ctrl+C", "Quit"),
];

/// Widget for rendering help overlay
pub struct HelpWidget;

impl HelpWidget {
    pub fn new() -> Self {
        Self
    }

    fn build_help_text() -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                "Keyboard Shortcuts",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        lines.extend(SHORTCUTS.iter().map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{:<10}", keys), Style::default().fg(Color::Yellow)),
                Span::raw(*what),
            ])
        }));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Topics and sources are managed with `ai-quiz topic` and `ai-quiz source`.",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(Color::DarkGray),
        )));
        lines
    }
}

impl Default for HelpWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for HelpWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .style(Style::default().fg(Color::Cyan));

        Clear.render(area, buf);
        Paragraph::new(Self::build_help_text())
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
