use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, user_name: &str, today: NaiveDate) {
    let title_line = Line::from(vec![
        Span::styled("  habitai  ", theme::accent().add_modifier(Modifier::BOLD)),
        Span::styled(format!("hi, {}", user_name), theme::dim()),
    ]);

    let date_line = Line::from(Span::styled(
        today.format("%A, %b %d, %Y").to_string(),
        theme::dim(),
    ));

    let text = vec![title_line, Line::from(""), date_line];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
