//! Current question with its options and feedback on the last answer

use crate::tui::state::TuiState;
use quiz_domain::OPTION_LABELS;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct QuestionWidget<'a> {
    state: &'a TuiState,
}

impl<'a> QuestionWidget<'a> {
    pub fn new(state: &'a TuiState) -> Self {
        Self { state }
    }
}

impl<'a> Widget for QuestionWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = Vec::new();
        let mut title = " Question ".to_string();

        if let Some(feedback) = &self.state.feedback {
            let color = if feedback.correct { Color::Green } else { Color::Red };
            lines.push(Line::from(Span::styled(
                feedback.message.as_str(),
                Style::default().fg(color),
            )));
            lines.push(Line::from(""));
        }

        match self.state.session.as_ref() {
            Some(session) if session.current().is_some() => {
                title = format!(" Question {} of {} ", session.position() + 1, session.len());
                if let Some(question) = session.current() {
                    lines.push(Line::from(Span::styled(
                        question.stem(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(""));
                    for (label, option) in OPTION_LABELS.iter().zip(question.options()) {
                        lines.push(Line::from(vec![
                            Span::styled(
                                format!("  {}) ", label),
                                Style::default().fg(Color::Cyan),
                            ),
                            Span::raw(option.as_str()),
                        ]));
                    }
                }
            }
            _ => lines.push(Line::from(Span::styled(
                "No question loaded",
                Style::default().fg(Color::DarkGray),
            ))),
        }

        if let Some(note) = &self.state.delivery_note {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                note.as_str(),
                Style::default().fg(Color::DarkGray),
            )));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .style(Style::default().fg(Color::White)),
            )
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::mode::Action;
    use crate::tui::widgets::render_to_string;
    use quiz_domain::{GenerationMode, Question, QuizSession};

    fn question(stem: &str) -> Question {
        Question::try_new(
            stem,
            vec!["Nucleus".into(), "Membrane".into(), "Wall".into(), "Ribosome".into()],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_question_and_feedback() {
        let mut state = TuiState::new(2, GenerationMode::Reuse);
        state.screen = crate::tui::state::Screen::Question;
        state.session = Some(QuizSession::new(vec![
            question("What surrounds a cell?"),
            question("What holds DNA?"),
        ]));

        let text = render_to_string(QuestionWidget::new(&state), 60, 12);
        assert!(text.contains("Question 1 of 2"));
        assert!(text.contains("What surrounds a cell?"));
        assert!(text.contains("B) Membrane"));

        state.handle_action(Action::Answer(0));
        let text = render_to_string(QuestionWidget::new(&state), 60, 12);
        assert!(text.contains("Question 2 of 2"));
        assert!(text.contains("Wrong. The answer was B) Membrane"));
    }
}
