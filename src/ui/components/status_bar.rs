use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::state::AppState;

/// Status bar widget
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let paragraph = Paragraph::new(Self::line(state));
        frame.render_widget(paragraph, area);
    }

    /// Build the status line
    pub fn line(state: &AppState) -> Line<'static> {
        let mut spans = vec![];

        // Data source
        spans.push(Span::styled(
            format!(" {} ", state.source.display_name()),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ));
        spans.push(Span::raw(" "));

        // Calibration multiplier
        spans.push(Span::styled(
            format!("cal x{:.2} ", state.multiplier),
            Style::default().fg(Color::Cyan),
        ));

        // Key hints
        spans.push(Span::styled(
            "q",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(":Quit ", Style::default().fg(Color::DarkGray)));

        // Error message
        if let Some(error) = &state.error_message {
            spans.push(Span::styled(
                format!(" Error: {} ", error),
                Style::default().fg(Color::White).bg(Color::Red),
            ));
        }

        // Seconds since the last successful poll
        if let Some(last_poll) = state.last_poll {
            spans.push(Span::styled(
                format!(" [{}s] ", last_poll.elapsed().as_secs()),
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            spans.push(Span::styled(
                " waiting for feed ",
                Style::default().fg(Color::DarkGray),
            ));
        }

        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FeedSource;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_status_shows_source_and_multiplier() {
        let mut state = AppState::new();
        state.source = FeedSource::Demo;
        state.multiplier = 1.25;
        let rendered = text(&StatusBar::line(&state));
        assert!(rendered.contains(" Demo "));
        assert!(rendered.contains("cal x1.25"));
        assert!(rendered.contains("waiting for feed"));
    }

    #[test]
    fn test_status_shows_error() {
        let mut state = AppState::new();
        state.set_error("Failed to parse feed file".to_string());
        let rendered = text(&StatusBar::line(&state));
        assert!(rendered.contains("Error: Failed to parse feed file"));
    }
}
