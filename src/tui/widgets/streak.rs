use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{DailyProgress, Streak};
use crate::tracking::achievements::streak_emoji;
use crate::tui::theme;
use crate::utils::format::progress_bar;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    streak: &Streak,
    weekly: &[DailyProgress],
    total_habits: u32,
) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    // Streak bar fills over 30 days
    let bar = progress_bar(streak.current.min(30), 30, 12);

    let streak_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(bar, theme::green()),
        Span::styled(
            format!("  {} days {}", streak.current, streak_emoji(streak.current)),
            theme::green().add_modifier(Modifier::BOLD),
        ),
    ]);

    let mut day_spans = vec![Span::raw("  ")];
    let mut dot_spans = vec![Span::raw("  ")];
    for d in weekly {
        let (dot, style) = if total_habits > 0 && d.completed >= total_habits {
            ("●", theme::green().add_modifier(Modifier::BOLD))
        } else if d.completed > 0 {
            ("◑", theme::amber())
        } else {
            ("○", theme::dim())
        };
        let label: String = d.day.chars().take(2).collect();
        day_spans.push(Span::styled(format!("{:<3}", label), theme::dim()));
        dot_spans.push(Span::styled(format!("{:<3}", dot), style));
    }

    let full_days = weekly
        .iter()
        .filter(|d| total_habits > 0 && d.completed >= total_habits)
        .count();
    let meta_line = Line::from(Span::styled(
        format!("  Best: {}  ·  Perfect days: {}/7", streak.best, full_days),
        theme::dim(),
    ));

    let text = vec![
        Line::from(""),
        streak_line,
        Line::from(""),
        Line::from(day_spans),
        Line::from(dot_spans),
        meta_line,
    ];
    let paragraph = Paragraph::new(text).block(block);
    frame.render_widget(paragraph, area);
}
