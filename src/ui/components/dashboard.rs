use ratatui::{layout::Rect, text::Text, widgets::Paragraph, Frame};

/// Dashboard body: a pre-built screen of marked-up lines
pub struct Dashboard;

impl Dashboard {
    /// Render the screen text into the area, clipped at the bottom
    pub fn render(frame: &mut Frame, area: Rect, text: Text<'static>) {
        frame.render_widget(Paragraph::new(text), area);
    }
}
