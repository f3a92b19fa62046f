use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::cli::args::UserCommands;
use crate::config::AppConfig;
use crate::db::repository::{AchievementRepo, HabitRepo, MetaRepo, RecordRepo, UserRepo};
use crate::insights::{self, GeminiClient, TextGenerator};
use crate::models::record::{format_date, parse_completion_date};
use crate::models::{Frequency, Habit, HabitUpdate, HabitWithRecords, NewHabit, User};
use crate::tracking::{analytics, build_month, longest_streak};
use crate::tracking::achievements::streak_emoji;
use crate::utils::dates::today;
use crate::utils::format::{format_percent, pad_to_width, plural, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const BLUE: &str = "\x1b[38;2;59;130;246m";

// ─── Setup ───────────────────────────────────────────────────────────────────

/// Create or select the local profile and remember it in config.
pub fn handle_setup(conn: &Connection, config: &mut AppConfig, reset: bool) -> Result<User> {
    if !reset {
        if let Some(user) = current_user(conn, config)? {
            println!("habitai is already set up for {} <{}>. Use --reset to switch profile.", user.name, user.email);
            return Ok(user);
        }
    }

    println!();
    println_colored!(BLUE, "  habitai setup");
    println!();
    let name = loop {
        let name = prompt("  Your name: ")?;
        if !name.trim().is_empty() {
            break name.trim().to_string();
        }
        println_colored!(RED, "  Name is required");
    };
    let email = loop {
        let email = prompt("  Email (identifies your profile): ")?;
        let email = email.trim().to_string();
        if email.contains('@') {
            break email;
        }
        println_colored!(RED, "  Please enter a valid email address");
    };

    let user = match UserRepo::get_by_email(conn, &email)? {
        Some(existing) => {
            println_colored!(DIM, "  Using existing profile for {}", existing.email);
            existing
        }
        None => UserRepo::create(conn, &name, &email)?,
    };

    config.profile.email = Some(user.email.clone());
    config.save()?;
    MetaRepo::set(conn, "setup_done", "1")?;

    println!();
    println_colored!(GREEN, "  ✓ Welcome, {}! Add your first habit with `habitai add <name>`.", user.name);
    println!();
    Ok(user)
}

/// The profile named in config, or the first profile in the database.
pub fn current_user(conn: &Connection, config: &AppConfig) -> Result<Option<User>> {
    if let Some(email) = &config.profile.email {
        if let Some(user) = UserRepo::get_by_email(conn, email)? {
            return Ok(Some(user));
        }
        log::warn!("Configured profile {} not found in database", email);
    }
    UserRepo::first(conn)
}

// ─── Habits ──────────────────────────────────────────────────────────────────

fn parse_frequency(s: Option<&str>) -> Result<Option<Frequency>> {
    s.map(Frequency::from_str)
        .transpose()
        .map_err(|_| anyhow!("Unknown frequency. Use: daily, weekly, monthly"))
}

/// Habits with every record up to `today`. Streaks need the whole history;
/// the lookback window only applies to rates.
fn habits_with_history(
    conn: &Connection,
    user_id: i64,
    include_inactive: bool,
    today: NaiveDate,
) -> Result<Vec<HabitWithRecords>> {
    HabitRepo::list(conn, user_id, include_inactive)?
        .into_iter()
        .map(|habit| {
            let records = RecordRepo::for_habit(conn, habit.id, None, Some(today))?;
            Ok(HabitWithRecords::new(habit, records))
        })
        .collect()
}

fn find_habit(conn: &Connection, user: &User, key: &str) -> Result<Habit> {
    HabitRepo::find(conn, user.id, key)?
        .ok_or_else(|| anyhow!("Habit '{}' not found. See `habitai list --all`", key))
}

pub fn handle_add(conn: &Connection, user: &User, new: NewHabit, frequency: Option<&str>) -> Result<()> {
    let new = NewHabit {
        frequency: parse_frequency(frequency)?,
        ..new
    };
    let habit = HabitRepo::create(conn, user.id, &new)?;
    println_colored!(
        GREEN,
        "  ✓ Added {} {} ({}, {}), id {}",
        habit.icon,
        habit.name,
        habit.category,
        habit.frequency,
        habit.id
    );
    Ok(())
}

pub fn handle_list(conn: &Connection, user: &User, config: &AppConfig, all: bool) -> Result<()> {
    let today = today();
    let lookback = config.tracking.lookback_days;
    let habits = habits_with_history(conn, user.id, all, today)?;

    println!();
    if habits.is_empty() {
        println_colored!(DIM, "  No habits yet. Add one with `habitai add <name>`.");
        println!();
        return Ok(());
    }

    println_colored!(BLUE, "  Habits");
    println!();
    for h in &habits {
        let stats = analytics::habit_stats(h, today, lookback);

        let mark = if stats.today_completed {
            format!("{}●\x1b[0m", GREEN)
        } else {
            format!("{}○\x1b[0m", DIM)
        };
        let archived = if h.habit.is_active { "" } else { "  (archived)" };
        println!(
            "  {} {:>3}  {} {}  {} {}  {}  {} done{}",
            mark,
            h.habit.id,
            pad_to_width(&h.habit.icon, 2),
            pad_to_width(&h.habit.name, 24),
            streak_emoji(stats.current_streak),
            pad_to_width(&plural(stats.current_streak, "day"), 8),
            pad_to_width(&format_percent(stats.completion_rate), 4),
            stats.total_completed,
            archived
        );
    }
    println!();
    println_colored!(DIM, "  ● done today  ·  rates over the last {} days", lookback);
    println!();
    Ok(())
}

pub fn handle_show(conn: &Connection, user: &User, config: &AppConfig, key: &str) -> Result<()> {
    let today = today();
    let habit = find_habit(conn, user, key)?;
    let records = RecordRepo::for_habit(conn, habit.id, None, Some(today))?;
    let recent = RecordRepo::recent(conn, habit.id, 30)?;
    let h = HabitWithRecords::new(habit, records);
    let a = analytics::habit_analytics(&h, today, config.tracking.lookback_days);

    println!();
    println_colored!(BOLD, "  {} {}", h.habit.icon, h.habit.name);
    if let Some(desc) = h.habit.description.as_deref().filter(|d| !d.is_empty()) {
        println_colored!(DIM, "  {}", desc);
    }
    println!(
        "  {} · {} · {}{}",
        h.habit.category,
        h.habit.frequency,
        h.habit.color,
        if h.habit.is_active { "" } else { " · archived" }
    );
    println!();
    println!("  Current streak:  {} {}", plural(a.current_streak, "day"), streak_emoji(a.current_streak));
    println!("  Longest streak:  {}", plural(a.longest_streak, "day"));
    println!(
        "  Last {} days:    {}/{} ({})  {}",
        a.total_days,
        a.completed_days,
        a.total_days,
        format_percent(a.completion_rate),
        progress_bar(a.completed_days, a.total_days, 12)
    );
    println!("  Per week:        {:.1}", a.average_per_week);
    println!("  Trend:           {} {:?}", a.trend_direction.arrow(), a.trend_direction);

    if !recent.is_empty() {
        println!();
        println_colored!(DIM, "  Recent records");
        for r in &recent {
            let (icon, color) = if r.completed { ("✓", GREEN) } else { ("✗", RED) };
            let note = r.notes.as_deref().map(|n| format!("  {}", n)).unwrap_or_default();
            println!("  {}{}\x1b[0m {}{}", color, icon, format_date(r.date), note);
        }
    }
    println!();
    Ok(())
}

pub fn handle_edit(conn: &Connection, user: &User, key: &str, update: HabitUpdate, frequency: Option<&str>) -> Result<()> {
    let habit = find_habit(conn, user, key)?;
    let update = HabitUpdate {
        frequency: parse_frequency(frequency)?,
        ..update
    };
    if update.is_empty() {
        return Err(anyhow!("Nothing to change. See `habitai edit --help`"));
    }
    if !HabitRepo::update(conn, user.id, habit.id, &update)? {
        return Err(anyhow!("Habit '{}' not found", key));
    }
    println_colored!(GREEN, "  ✓ Updated {}", habit.name);
    Ok(())
}

pub fn handle_remove(conn: &Connection, user: &User, key: &str) -> Result<()> {
    let habit = find_habit(conn, user, key)?;
    HabitRepo::deactivate(conn, user.id, habit.id)?;
    println_colored!(AMBER, "  Archived {} (history kept; restore with `habitai edit {} --active true`)", habit.name, habit.id);
    Ok(())
}

pub fn handle_done(
    conn: &Connection,
    user: &User,
    key: &str,
    date: Option<&str>,
    undo: bool,
    note: Option<&str>,
) -> Result<()> {
    let today = today();
    let habit = find_habit(conn, user, key)?;
    if !habit.is_active {
        return Err(anyhow!("{} is archived. Restore it with `habitai edit {} --active true`", habit.name, habit.id));
    }
    let date = match date {
        Some(s) => parse_completion_date(s, today)?,
        None => today,
    };

    RecordRepo::upsert(conn, &habit, date, !undo, note)?;
    let records = RecordRepo::for_habit(conn, habit.id, None, Some(today))?;
    let streak = crate::tracking::current_streak(&records, today);

    let when = if date == today { "today".to_string() } else { format_date(date) };
    if undo {
        println_colored!(DIM, "  ○ {} {}: not done {}", habit.icon, habit.name, when);
    } else {
        println_colored!(GREEN, "  ✓ {} {}: done {}", habit.icon, habit.name, when);
    }
    println_colored!(BOLD, "  Streak: {} {}", plural(streak, "day"), streak_emoji(streak));

    if let Err(e) = AchievementRepo::refresh(conn, user.id, today) {
        log::warn!("Achievement refresh failed: {}", e);
    }
    Ok(())
}

// ─── Calendar ────────────────────────────────────────────────────────────────

pub fn handle_calendar(
    conn: &Connection,
    user: &User,
    year: Option<i32>,
    month: Option<u32>,
    json: bool,
) -> Result<()> {
    let today = today();
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;
    let last = first + Duration::days(i64::from(crate::tracking::days_in_month(year, month)?) - 1);
    let habits = HabitRepo::list_with_records(conn, user.id, Some(first), Some(last))?;
    let grid = build_month(year, month, &habits, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
        return Ok(());
    }

    println!();
    println_colored!(BLUE, "  {}", first.format("%B %Y"));
    println!();
    println_colored!(DIM, "   Sun   Mon   Tue   Wed   Thu   Fri   Sat");
    let total = habits.len();
    for week in grid.weeks() {
        let mut line = String::from("  ");
        for cell in week {
            let day = format!("{:>2}", cell.date.day());
            let done = cell.completed_count();
            let (color, marker) = if !cell.is_current_month {
                (DIM, ' ')
            } else if total > 0 && done == total {
                (GREEN, '●')
            } else if done > 0 {
                (AMBER, '◑')
            } else {
                ("", ' ')
            };
            if cell.is_today {
                line.push_str(&format!(" {}{}[{}]\x1b[0m{}", BOLD, color, day, marker));
            } else {
                line.push_str(&format!("  {}{}\x1b[0m{} ", color, day, marker));
            }
            line.push(' ');
        }
        println!("{}", line.trim_end());
    }
    println!();
    println_colored!(DIM, "  ● all habits done  ◑ some done  [ ] today");
    println!();
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, user: &User, config: &AppConfig, json: bool) -> Result<()> {
    let today = today();
    let lookback = config.tracking.lookback_days;
    let habits = HabitRepo::list_with_records(conn, user.id, None, Some(today))?;
    let dashboard = analytics::dashboard(&habits, today, lookback);
    let per_habit: Vec<_> = habits
        .iter()
        .map(|h| analytics::habit_analytics(h, today, lookback))
        .collect();

    if json {
        let body = serde_json::json!({ "dashboard": dashboard, "habits": per_habit });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!();
    println_colored!(BLUE, "  Statistics");
    println!();
    println!("  Active habits:    {}", dashboard.total_habits);
    println!("  Done today:       {}/{}", dashboard.completed_today, dashboard.total_habits);
    println!("  Completion rate:  {}", format_percent(dashboard.completion_rate));
    println_colored!(
        BOLD,
        "  Longest streak:   {} {}",
        plural(dashboard.longest_streak, "day"),
        streak_emoji(dashboard.longest_streak)
    );

    println!();
    println_colored!(DIM, "  Last 7 days");
    for d in &dashboard.weekly_progress {
        println!(
            "  {}  {}  {}/{}",
            d.day,
            progress_bar(d.completed, dashboard.total_habits, 10),
            d.completed,
            dashboard.total_habits
        );
    }

    if !per_habit.is_empty() {
        println!();
        println_colored!(DIM, "  By habit (last {} days)", lookback);
        for a in &per_habit {
            println!(
                "  {}  {}  streak {:>3}  best {:>3}  {:.1}/wk  {}",
                pad_to_width(&a.habit_name, 24),
                pad_to_width(&format_percent(a.completion_rate), 4),
                a.current_streak,
                a.longest_streak,
                a.average_per_week,
                a.trend_direction.arrow()
            );
        }
    }
    println!();
    Ok(())
}

// ─── Achievements ────────────────────────────────────────────────────────────

pub fn handle_achievements(conn: &Connection, user: &User) -> Result<()> {
    let progress = AchievementRepo::refresh(conn, user.id, today())?;

    println!();
    println_colored!(BLUE, "  Achievements");
    println!();
    for item in &progress {
        let a = &item.achievement;
        let icon = a.icon.as_deref().unwrap_or("🏅");
        if item.unlocked {
            let when = item.unlocked_at.as_deref().unwrap_or("");
            println_colored!(GREEN, "  {} {}  unlocked {}", pad_to_width(icon, 2), pad_to_width(&a.title, 18), when);
        } else {
            println!(
                "  {} {}  {}  {}/{}",
                pad_to_width(icon, 2),
                pad_to_width(&a.title, 18),
                progress_bar(item.progress, a.criteria_value, 10),
                item.progress,
                a.criteria_value
            );
        }
        if let Some(desc) = &a.description {
            println_colored!(DIM, "     {}", desc);
        }
    }
    println!();
    Ok(())
}

// ─── AI ──────────────────────────────────────────────────────────────────────

fn ai_client(config: &AppConfig) -> Result<GeminiClient, insights::AiError> {
    GeminiClient::from_config(&config.ai)
}

pub fn handle_insights(conn: &Connection, user: &User, config: &AppConfig) -> Result<()> {
    let today = today();
    let habits = habits_with_history(conn, user.id, false, today)?;
    let summaries = analytics::summarize(&habits, today, config.tracking.lookback_days);

    let client = ai_client(config);
    let text = insights::generate_insights(
        client.as_ref().map(|c| c as &dyn TextGenerator).map_err(|e| e.clone()),
        &summaries,
    );

    println!();
    println_colored!(BLUE, "  ✨ AI Insights");
    println!();
    for line in text.lines() {
        println!("  {}", line);
    }
    println!();
    Ok(())
}

pub fn handle_suggest(conn: &Connection, user: &User, config: &AppConfig, goals: Option<&str>, add: bool) -> Result<()> {
    let client = ai_client(config);
    let suggestions = insights::generate_suggestions(
        client.as_ref().map(|c| c as &dyn TextGenerator).map_err(|e| e.clone()),
        goals.unwrap_or(""),
    );

    println!();
    println_colored!(BLUE, "  💡 Suggested habits");
    println!();
    for s in &suggestions {
        println_colored!(BOLD, "  {}  ({})", s.name, s.category);
        println_colored!(DIM, "     {}", s.description);
        if add {
            let habit = HabitRepo::create(
                conn,
                user.id,
                &NewHabit {
                    name: s.name.clone(),
                    description: Some(s.description.clone()),
                    category: Some(s.category.clone()),
                    color: s.color.clone(),
                    icon: s.icon.clone(),
                    ..Default::default()
                },
            )
            .with_context(|| format!("Adding suggested habit '{}'", s.name))?;
            println_colored!(GREEN, "     ✓ added as #{}", habit.id);
        }
    }
    if !add {
        println!();
        println_colored!(DIM, "  Run with --add to create these habits");
    }
    println!();
    Ok(())
}

// ─── User ────────────────────────────────────────────────────────────────────

pub fn handle_user(conn: &Connection, user: &User, action: Option<&UserCommands>) -> Result<()> {
    if let Some(UserCommands::Rename { name }) = action {
        if name.trim().is_empty() {
            return Err(anyhow!("Name is required"));
        }
        UserRepo::rename(conn, user.id, name.trim())?;
        println_colored!(GREEN, "  ✓ Profile renamed to {}", name.trim());
        return Ok(());
    }

    let summary = UserRepo::summary(conn, user.id, today())?
        .ok_or_else(|| anyhow!("User not found"))?;
    println!();
    println_colored!(BOLD, "  {} <{}>", summary.user.name, summary.user.email);
    println_colored!(DIM, "  Member since {}", summary.user.created_at);
    println!();
    println!("  Active habits:          {}", summary.active_habits);
    println!("  Completions (7 days):   {}", summary.recent_completions);
    println!();
    Ok(())
}

// ─── Seed ────────────────────────────────────────────────────────────────────

pub fn handle_seed(conn: &Connection, user: &User) -> Result<()> {
    let samples = [
        ("Morning Exercise", "30 minutes of physical activity", "Health", "#10B981", "🏃"),
        ("Read for 20 minutes", "Daily reading habit", "Learning", "#3B82F6", "📚"),
        ("Drink Water", "8 glasses of water daily", "Health", "#06B6D4", "💧"),
    ];
    let today = today();

    for (i, (name, description, category, color, icon)) in samples.iter().enumerate() {
        let habit = HabitRepo::create(
            conn,
            user.id,
            &NewHabit {
                name: name.to_string(),
                description: Some(description.to_string()),
                category: Some(category.to_string()),
                frequency: Some(Frequency::Daily),
                color: Some(color.to_string()),
                icon: Some(icon.to_string()),
            },
        )?;
        for offset in 0..5i64 {
            // Deterministic gaps so each sample ends up with a different streak.
            let completed = (offset + i as i64) % 4 != 3;
            let note = if completed { Some("Done!") } else { None };
            RecordRepo::upsert(conn, &habit, today - Duration::days(offset), completed, note)?;
        }
    }
    AchievementRepo::refresh(conn, user.id, today)?;
    println_colored!(GREEN, "  ✓ Created {} sample habits with 5 days of history", samples.len());
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn handle_export(conn: &Connection, user: &User) -> Result<()> {
    let today = today();
    let week_start = today - Duration::days(6);
    let habits = HabitRepo::list_with_records(conn, user.id, None, Some(today))?;
    let dashboard = analytics::dashboard(&habits, today, 7);

    println!("# habitai weekly summary");
    println!("# {} ({} – {})", user.name, format_date(week_start), format_date(today));
    println!();
    println!("## Daily completion");
    for d in &dashboard.weekly_progress {
        println!(
            "  {}  {}/{}  {}",
            d.date,
            d.completed,
            dashboard.total_habits,
            progress_bar(d.completed, dashboard.total_habits, 5)
        );
    }
    println!();
    println!("## Habits");
    for (h, streak) in habits.iter().zip(&dashboard.current_streaks) {
        println!(
            "  {} {}  streak {} (best {})",
            h.habit.icon,
            h.habit.name,
            streak,
            longest_streak(&h.records)
        );
    }
    println!();
    println!("## Summary");
    println!("  Completions this week: {}", dashboard.total_this_week());
    println!("  Completion rate:       {}", format_percent(dashboard.completion_rate));
    println!("  Longest streak:        {}", dashboard.longest_streak);
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    read_answer(&mut io::stdin().lock())
}

fn read_answer(input: &mut impl BufRead) -> Result<String> {
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Err(anyhow!("stdin closed during setup. Run `habitai setup` in a terminal"));
    }
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::tracking::day;

    fn setup() -> (Connection, User) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let user = UserRepo::create(&conn, "Test User", "test@habitai.com").unwrap();
        (conn, user)
    }

    fn forty_day_habit(conn: &Connection, user: &User, today: NaiveDate) {
        let habit = HabitRepo::create(
            conn,
            user.id,
            &NewHabit {
                name: "Read".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        for offset in 0..40 {
            RecordRepo::upsert(conn, &habit, today - Duration::days(offset), true, None).unwrap();
        }
    }

    #[test]
    fn streaks_are_not_cut_off_by_the_lookback_window() {
        let (conn, user) = setup();
        let today = day(2024, 6, 30);
        forty_day_habit(&conn, &user, today);

        let habits = habits_with_history(&conn, user.id, false, today).unwrap();
        let stats = analytics::habit_stats(&habits[0], today, 30);
        assert_eq!(stats.current_streak, 40);
        assert_eq!(stats.total_completed, 30);

        let summaries = analytics::summarize(&habits, today, 30);
        assert_eq!(summaries[0].recent_streak, 40);
        assert_eq!(summaries[0].completed_days, 30);
    }

    #[test]
    fn archived_habits_are_listed_only_on_request() {
        let (conn, user) = setup();
        let today = day(2024, 6, 30);
        forty_day_habit(&conn, &user, today);
        let id = habits_with_history(&conn, user.id, false, today).unwrap()[0].habit.id;
        HabitRepo::deactivate(&conn, user.id, id).unwrap();

        assert!(habits_with_history(&conn, user.id, false, today).unwrap().is_empty());
        assert_eq!(habits_with_history(&conn, user.id, true, today).unwrap().len(), 1);
    }

    #[test]
    fn answers_are_trimmed_of_line_endings() {
        let mut input = io::Cursor::new(b"Sam\r\nnext\n".to_vec());
        assert_eq!(read_answer(&mut input).unwrap(), "Sam");
        assert_eq!(read_answer(&mut input).unwrap(), "next");
    }

    #[test]
    fn closed_stdin_is_an_error() {
        let mut input = io::Cursor::new(Vec::new());
        assert!(read_answer(&mut input).is_err());
        let mut blank_then_eof = io::Cursor::new(b"\n".to_vec());
        assert_eq!(read_answer(&mut blank_then_eof).unwrap(), "");
        assert!(read_answer(&mut blank_then_eof).is_err());
    }
}
