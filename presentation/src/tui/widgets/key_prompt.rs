//! API key entry overlay

use crate::tui::state::TuiState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Characters of the key shown in clear text at the end
const VISIBLE_TAIL: usize = 4;

pub struct KeyPromptWidget<'a> {
    state: &'a TuiState,
}

impl<'a> KeyPromptWidget<'a> {
    pub fn new(state: &'a TuiState) -> Self {
        Self { state }
    }
}

/// Mask all but the last few characters of a typed key
fn mask(input: &str) -> String {
    let count = input.chars().count();
    let hidden = count.saturating_sub(VISIBLE_TAIL);
    input
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '•' } else { c })
        .collect()
}

impl<'a> Widget for KeyPromptWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(prompt) = &self.state.key_prompt else {
            return;
        };

        let mut lines = vec![
            Line::from("Paste the API key for the completion endpoint."),
            Line::from(""),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Yellow)),
                Span::raw(mask(&prompt.input)),
                Span::styled("█", Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
        ];

        if self.state.validating {
            lines.push(Line::from(Span::styled(
                "Checking key...",
                Style::default().fg(Color::Yellow),
            )));
        } else if let Some(error) = &prompt.error {
            lines.push(Line::from(Span::styled(
                error.as_str(),
                Style::default().fg(Color::Red),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: check and save   Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )));

        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                " API Key ",
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().fg(Color::Yellow));

        Clear.render(area, buf);
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::widgets::render_to_string;
    use quiz_domain::GenerationMode;

    #[test]
    fn test_mask_keeps_tail() {
        assert_eq!(mask("gsk_abcdef"), "••••••cdef");
        assert_eq!(mask("abc"), "abc");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn test_prompt_shows_error() {
        let mut state = TuiState::new(5, GenerationMode::Reuse);
        state.open_key_prompt(Some("Authentication failed: HTTP 401".into()));
        let text = render_to_string(KeyPromptWidget::new(&state), 60, 10);
        assert!(text.contains("API Key"));
        assert!(text.contains("HTTP 401"));

        state.validating = true;
        let text = render_to_string(KeyPromptWidget::new(&state), 60, 10);
        assert!(text.contains("Checking key"));
    }

    #[test]
    fn test_nothing_rendered_without_prompt() {
        let state = TuiState::new(5, GenerationMode::Reuse);
        let text = render_to_string(KeyPromptWidget::new(&state), 20, 3);
        assert!(text.trim().is_empty());
    }
}
