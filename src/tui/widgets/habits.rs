use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{HabitStats, HabitWithRecords};
use crate::tui::theme;
use crate::utils::format::{format_percent, pad_to_width};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    habits: &[HabitWithRecords],
    stats: &[HabitStats],
    focused_idx: usize,
) {
    let done = stats.iter().filter(|s| s.today_completed).count();
    let block = Block::default()
        .title(Span::styled(
            format!(" Today {}/{} ", done, habits.len()),
            theme::accent(),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(theme::surface());

    if habits.is_empty() {
        let empty = List::new(vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled(
                "  No habits yet. Press [a] to add one.",
                theme::dim(),
            ))),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = habits
        .iter()
        .zip(stats)
        .enumerate()
        .map(|(i, (h, s))| {
            let is_focused = i == focused_idx;
            let color = Style::default().fg(theme::hex_color(&h.habit.color));

            let (mark, mark_style) = if s.today_completed {
                ("●", color.add_modifier(Modifier::BOLD))
            } else {
                ("○", theme::dim())
            };

            let name_style = if is_focused {
                theme::accent().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };
            let cursor = if is_focused { "▸ " } else { "  " };

            let line = Line::from(vec![
                Span::styled(cursor, theme::accent()),
                Span::styled(format!("{} ", mark), mark_style),
                Span::raw(pad_to_width(&h.habit.icon, 3)),
                Span::styled(pad_to_width(&h.habit.name, 22), name_style),
                Span::styled(format!("{:>3}d ", s.current_streak), theme::green()),
                Span::styled(format!("{:>4}", format_percent(s.completion_rate)), theme::dim()),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
