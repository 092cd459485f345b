//! Status bar widget: mode indicator, key hints and flash messages

use crate::tui::mode::Mode;
use crate::tui::state::{Screen, TuiState};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub struct StatusBarWidget<'a> {
    state: &'a TuiState,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(state: &'a TuiState) -> Self {
        Self { state }
    }

    fn hints(&self) -> &'static str {
        if self.state.mode == Mode::KeyEntry {
            return "Enter:check  Esc:cancel  Ctrl+C:quit";
        }
        match self.state.screen {
            Screen::Topics => "j/k:move  Enter:open  K:key  r:reload  ?:help  q:quit",
            Screen::Sources => "j/k:move  Enter:choose  Esc:back  ?:help",
            Screen::Setup => "Enter:start  +/-:count  m:mode  Esc:back",
            Screen::Question => "a-d:answer  Esc:abandon  ?:help",
            Screen::Results => "Enter:again  Esc:topics  q:quit",
        }
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        let bg_style = Style::default().bg(Color::DarkGray).fg(Color::White);
        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(bg_style).set_char(' ');
        }

        let mode = &self.state.mode;

        // Left: mode indicator
        let mode_text = mode.indicator();
        let mode_style = Style::default()
            .fg(Color::Black)
            .bg(mode.color())
            .add_modifier(Modifier::BOLD);
        let mode_line = Line::from(vec![Span::styled(format!(" {} ", mode_text), mode_style)]);
        let mode_width = mode_text.len() as u16 + 2;
        buf.set_line(area.x, area.y, &mode_line, mode_width);

        // Flash message or key hints on the right
        let right_text = match &self.state.flash_message {
            Some((flash, _)) => flash.clone(),
            None => self.hints().to_string(),
        };
        let right_width = right_text.chars().count() as u16;
        let right_x = area.right().saturating_sub(right_width + 1);
        if right_x > area.x + mode_width {
            let right_line = Line::from(vec![Span::styled(
                right_text,
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )]);
            buf.set_line(right_x, area.y, &right_line, right_width + 1);
        } else {
            // Narrow terminal: truncate after the mode indicator
            let line = Line::from(Span::raw(right_text));
            let x = area.x + mode_width + 1;
            buf.set_line(x, area.y, &line, area.right().saturating_sub(x));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::widgets::render_to_string;
    use quiz_domain::GenerationMode;

    #[test]
    fn test_hints_follow_screen() {
        let mut state = TuiState::new(5, GenerationMode::Reuse);
        let text = render_to_string(StatusBarWidget::new(&state), 80, 1);
        assert!(text.contains("QUIZ"));
        assert!(text.contains("Enter:open"));

        state.screen = Screen::Question;
        let text = render_to_string(StatusBarWidget::new(&state), 80, 1);
        assert!(text.contains("a-d:answer"));
    }

    #[test]
    fn test_flash_replaces_hints() {
        let mut state = TuiState::new(5, GenerationMode::Reuse);
        state.flash("API key saved");
        let text = render_to_string(StatusBarWidget::new(&state), 80, 1);
        assert!(text.contains("API key saved"));
        assert!(!text.contains("Enter:open"));
    }
}
