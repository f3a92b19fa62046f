use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use crossterm::event::{KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::{AchievementRepo, HabitRepo, RecordRepo};
use crate::models::{
    AchievementProgress, DashboardStats, HabitAnalytics, HabitStats, HabitWithRecords, MonthGrid,
    NewHabit, Streak, User,
};
use crate::tracking::{analytics, build_month, longest_streak};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{achievements, calendar, habits, header, statusbar, streak};
use crate::utils::dates;
use crate::utils::format::{format_percent, pad_to_width, progress_bar};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    AddHabit,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub user: User,
    pub focus_idx: usize,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_error: Option<String>,
    pub show_achievements: bool,
    pub status: Option<String>,

    // Cached state (refreshed on tick/action)
    pub today: NaiveDate,
    pub month: (i32, u32),
    pub habits: Vec<HabitWithRecords>,
    pub stats: Vec<HabitStats>,
    pub analytics: Vec<HabitAnalytics>,
    pub dashboard: DashboardStats,
    pub streak: Streak,
    pub grid: Option<MonthGrid>,
    pub achievements: Vec<AchievementProgress>,
}

/// Step `(year, month)` by `delta` months.
pub fn shift_month((year, month): (i32, u32), delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

impl App {
    pub fn new(config: AppConfig, user: User, today: NaiveDate) -> Self {
        App {
            view: View::Dashboard,
            config,
            user,
            focus_idx: 0,
            should_quit: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_error: None,
            show_achievements: false,
            status: None,
            today,
            month: (today.year(), today.month()),
            habits: Vec::new(),
            stats: Vec::new(),
            analytics: Vec::new(),
            dashboard: analytics::dashboard(&[], today, 7),
            streak: Streak::default(),
            grid: None,
            achievements: Vec::new(),
        }
    }

    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        let lookback = self.config.tracking.lookback_days;
        self.habits = HabitRepo::list_with_records(conn, self.user.id, None, Some(self.today))?;
        self.stats = self
            .habits
            .iter()
            .map(|h| analytics::habit_stats(h, self.today, lookback))
            .collect();
        self.analytics = self
            .habits
            .iter()
            .map(|h| analytics::habit_analytics(h, self.today, lookback))
            .collect();
        self.dashboard = analytics::dashboard(&self.habits, self.today, lookback);
        self.streak = Streak {
            current: self.dashboard.longest_streak,
            best: self
                .habits
                .iter()
                .map(|h| longest_streak(&h.records))
                .max()
                .unwrap_or(0),
        };
        self.grid = Some(build_month(self.month.0, self.month.1, &self.habits, self.today)?);
        self.achievements = AchievementRepo::progress(conn, self.user.id)?;

        if self.focus_idx >= self.habits.len() {
            self.focus_idx = self.habits.len().saturating_sub(1);
        }
        Ok(())
    }

    /// Reload if the date rolled over while the dashboard was open.
    pub fn tick(&mut self, conn: &Connection) {
        let today = dates::today();
        if today != self.today {
            self.today = today;
            self.month = (today.year(), today.month());
            self.reload(conn);
        }
    }

    fn reload(&mut self, conn: &Connection) {
        if let Err(e) = self.load(conn) {
            log::error!("Reload failed: {:#}", e);
            self.status = Some(format!("✗ {}", e));
        }
    }

    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent, conn: &Connection) {
        // Some terminals also report key release and repeat
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.input_mode {
            InputMode::AddHabit => self.handle_add_input(key, conn),
            InputMode::Normal => self.handle_normal_key(key, conn),
        }
    }

    fn handle_normal_key(&mut self, key: crossterm::event::KeyEvent, conn: &Connection) {
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key, conn),
            View::Stats => self.handle_stats_key(key),
            View::Help => self.handle_help_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: crossterm::event::KeyEvent, conn: &Connection) {
        if self.show_achievements {
            self.show_achievements = false;
            return;
        }
        self.status = None;

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('s') => {
                self.view = View::Stats;
            }
            KeyCode::Char('g') => {
                self.show_achievements = true;
            }
            KeyCode::Char('a') => {
                self.input_mode = InputMode::AddHabit;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.focus_idx + 1 < self.habits.len() {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Left => self.change_month(-1, conn),
            KeyCode::Right => self.change_month(1, conn),
            KeyCode::Char('t') => {
                self.month = (self.today.year(), self.today.month());
                self.reload(conn);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_focused(conn),
            KeyCode::Char('x') => self.archive_focused(conn),
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: crossterm::event::KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('s') => {
                self.view = View::Dashboard;
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: crossterm::event::KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') => {
                self.view = View::Dashboard;
            }
            _ => {}
        }
    }

    fn handle_add_input(&mut self, key: crossterm::event::KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Enter => {
                let name = self.input_buffer.trim().to_string();
                if name.is_empty() {
                    self.input_error = Some("Type a habit name first".to_string());
                    return;
                }
                let new = NewHabit {
                    name,
                    ..Default::default()
                };
                match HabitRepo::create(conn, self.user.id, &new) {
                    Ok(habit) => {
                        self.input_mode = InputMode::Normal;
                        self.input_buffer.clear();
                        self.input_error = None;
                        self.status = Some(format!("✓ Added {}", habit.name));
                        self.reload(conn);
                        self.focus_idx = self
                            .habits
                            .iter()
                            .position(|h| h.habit.id == habit.id)
                            .unwrap_or(self.focus_idx);
                    }
                    Err(e) => {
                        self.input_error = Some(e.to_string());
                    }
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    fn change_month(&mut self, delta: i32, conn: &Connection) {
        self.month = shift_month(self.month, delta);
        match build_month(self.month.0, self.month.1, &self.habits, self.today) {
            Ok(grid) => self.grid = Some(grid),
            Err(e) => {
                log::warn!("Calendar unavailable: {}", e);
                self.reload(conn);
            }
        }
    }

    fn toggle_focused(&mut self, conn: &Connection) {
        let Some(h) = self.habits.get(self.focus_idx) else {
            return;
        };
        let habit = h.habit.clone();
        match RecordRepo::toggle(conn, &habit, self.today) {
            Ok(done) => {
                if done {
                    self.status = Some(format!("✓ {} done today", habit.name));
                }
                if let Err(e) = AchievementRepo::refresh(conn, self.user.id, self.today) {
                    log::warn!("Achievement refresh failed: {}", e);
                }
                self.reload(conn);
            }
            Err(e) => {
                log::error!("Toggle failed for habit {}: {:#}", habit.id, e);
                self.status = Some(format!("✗ {}", e));
            }
        }
    }

    fn archive_focused(&mut self, conn: &Connection) {
        let Some(h) = self.habits.get(self.focus_idx) else {
            return;
        };
        let (id, name) = (h.habit.id, h.habit.name.clone());
        match HabitRepo::deactivate(conn, self.user.id, id) {
            Ok(_) => {
                self.status = Some(format!("Archived {}", name));
                self.reload(conn);
            }
            Err(e) => {
                self.status = Some(format!("✗ {}", e));
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }

        if self.input_mode == InputMode::AddHabit {
            self.draw_add_input(frame);
        }

        if self.show_achievements {
            let area = frame.area();
            let popup_area = Rect {
                x: area.width / 6,
                y: area.height / 6,
                width: area.width * 2 / 3,
                height: (self.achievements.len() as u16 + 5).min(area.height),
            };
            frame.render_widget(Clear, popup_area);
            achievements::render(frame, popup_area, &self.achievements);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0], &self.user.name, self.today);
        statusbar::render(frame, outer_chunks[2], self.status.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        habits::render(frame, columns[0], &self.habits, &self.stats, self.focus_idx);

        let show_calendar = self.config.display.show_calendar && self.grid.is_some();
        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(if show_calendar {
                [Constraint::Length(8), Constraint::Min(0)]
            } else {
                [Constraint::Min(0), Constraint::Length(0)]
            })
            .split(columns[1]);

        streak::render(
            frame,
            right_chunks[0],
            &self.streak,
            &self.dashboard.weekly_progress,
            self.dashboard.total_habits,
        );
        if let (true, Some(grid)) = (show_calendar, &self.grid) {
            calendar::render(frame, right_chunks[1], grid);
        }
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Stats  ", theme::accent().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let d = &self.dashboard;
        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Active habits:     ", theme::dim()),
                Span::styled(format!("{}", d.total_habits), theme::bold()),
            ]),
            Line::from(vec![
                Span::styled("  Done today:        ", theme::dim()),
                Span::styled(
                    format!("{}/{}", d.completed_today, d.total_habits),
                    theme::green().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Completion rate:   ", theme::dim()),
                Span::styled(format_percent(d.completion_rate), theme::amber()),
            ]),
            Line::from(vec![
                Span::styled("  Streak (current):  ", theme::dim()),
                Span::styled(format!("{} days", self.streak.current), theme::green()),
            ]),
            Line::from(vec![
                Span::styled("  Streak (best):     ", theme::dim()),
                Span::styled(format!("{} days", self.streak.best), theme::green()),
            ]),
            Line::from(""),
            Line::from(Span::styled("  Last 7 Days", theme::accent())),
            Line::from(""),
        ];

        for day in &d.weekly_progress {
            let style = if d.total_habits > 0 && day.completed >= d.total_habits {
                theme::green()
            } else if day.completed > 0 {
                theme::amber()
            } else {
                theme::dim()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {}  ", day.day), theme::dim()),
                Span::styled(progress_bar(day.completed, d.total_habits, 12), style),
                Span::styled(format!("  {}/{}", day.completed, d.total_habits), theme::dim()),
            ]));
        }

        if !self.analytics.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  By habit (last {} days)", self.config.tracking.lookback_days),
                theme::accent(),
            )));
            lines.push(Line::from(""));
            for a in &self.analytics {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}", pad_to_width(&a.habit_name, 22)), theme::bold()),
                    Span::styled(
                        format!("{:>5}", format_percent(a.completion_rate)),
                        theme::amber(),
                    ),
                    Span::styled(
                        format!(
                            "  best {:>3}  {:.1}/wk  {}",
                            a.longest_streak,
                            a.average_per_week,
                            a.trend_direction.arrow()
                        ),
                        theme::dim(),
                    ),
                ]));
            }
        }

        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: area.height / 2,
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("[Enter] / Space", "Toggle focused habit for today"),
            ("[a]", "Add a habit"),
            ("[x]", "Archive focused habit"),
            ("[↑ ↓] / j k", "Navigate habits"),
            ("[← →]", "Previous / next month"),
            ("[t]", "Back to this month"),
            ("[g]", "Achievements"),
            ("[s]", "Stats view"),
            ("[?]", "Toggle help"),
            ("[q] / Esc", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, action) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {}", pad_to_width(key, 17)), theme::accent()),
                Span::styled(action, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::accent())
            .style(theme::surface());

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_add_input(&self, frame: &mut Frame) {
        let area = frame.area();
        let height = if self.input_error.is_some() { 7 } else { 5 };

        let popup_area = Rect {
            x: area.width / 4,
            y: (area.height / 2).saturating_sub(3),
            width: area.width / 2,
            height,
        };

        frame.render_widget(Clear, popup_area);

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Habit name: ", theme::dim()),
                Span::styled(
                    self.input_buffer.as_str(),
                    theme::accent().add_modifier(Modifier::BOLD),
                ),
                Span::styled("█", theme::amber()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  [Enter] add  ·  [Esc] cancel",
                theme::dim(),
            )),
        ];

        if let Some(err) = &self.input_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let border_style = if self.input_error.is_some() {
            theme::red()
        } else {
            theme::accent()
        };

        let block = Block::default()
            .title(Span::styled(" New Habit ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .style(theme::surface());

        let paragraph = Paragraph::new(text).block(block);
        frame.render_widget(paragraph, popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig, user: User) -> Result<()> {
    if let Err(e) = AchievementRepo::refresh(&conn, user.id, dates::today()) {
        log::warn!("Achievement refresh failed: {}", e);
    }
    let mut app = App::new(config, user, dates::today());
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(1000);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                app.handle_key(key, &conn);
                if app.should_quit {
                    break Ok(());
                }
            }
            Ok(Event::Tick) => app.tick(&conn),
            Err(e) => break Err(e.into()),
        }
    };

    ratatui::restore();
    result
}
