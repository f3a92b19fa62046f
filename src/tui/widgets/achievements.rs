use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::AchievementProgress;
use crate::tui::theme;
use crate::utils::format::{pad_to_width, progress_bar};

pub fn render(frame: &mut Frame, area: Rect, progress: &[AchievementProgress]) {
    let unlocked = progress.iter().filter(|p| p.unlocked).count();
    let block = Block::default()
        .title(Span::styled(
            format!(" Achievements {}/{} ", unlocked, progress.len()),
            theme::accent(),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::amber())
        .style(theme::surface());

    let mut lines = vec![Line::from("")];
    for item in progress {
        let a = &item.achievement;
        let icon = pad_to_width(a.icon.as_deref().unwrap_or("🏅"), 2);
        let title = pad_to_width(&a.title, 18);
        if item.unlocked {
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", icon), theme::bold()),
                Span::styled(title, theme::green().add_modifier(Modifier::BOLD)),
                Span::styled("  unlocked", theme::green()),
            ]));
        } else {
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", icon), theme::dim()),
                Span::styled(title, theme::dim()),
                Span::styled(
                    format!("  {}", progress_bar(item.progress, a.criteria_value, 10)),
                    theme::amber(),
                ),
                Span::styled(
                    format!("  {}/{} ({}%)", item.progress, a.criteria_value, item.percent()),
                    theme::dim(),
                ),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  [any key] close", theme::dim())));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
