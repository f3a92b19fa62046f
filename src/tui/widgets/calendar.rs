use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::MonthGrid;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, grid: &MonthGrid) {
    let title = NaiveDate::from_ymd_opt(grid.year, grid.month, 1)
        .map(|d| d.format(" %B %Y ").to_string())
        .unwrap_or_else(|| format!(" {}-{:02} ", grid.year, grid.month));

    let block = Block::default()
        .title(Span::styled(title, theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let mut lines = vec![Line::from(Span::styled(
        " Su  Mo  Tu  We  Th  Fr  Sa ",
        theme::dim(),
    ))];

    for week in grid.weeks() {
        let mut spans = Vec::with_capacity(7);
        for cell in week {
            let total = cell.habits.len();
            let done = cell.completed_count();
            let mut style = if !cell.is_current_month {
                theme::dim()
            } else if total > 0 && done == total {
                theme::green().add_modifier(Modifier::BOLD)
            } else if done > 0 {
                theme::amber()
            } else {
                theme::bold()
            };
            if cell.is_today {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let text = if cell.is_current_month {
                format!("{:>2}", cell.date.day())
            } else {
                " ·".to_string()
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("●", theme::green()),
        Span::styled(" all  ", theme::dim()),
        Span::styled("●", theme::amber()),
        Span::styled(" some", theme::dim()),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
