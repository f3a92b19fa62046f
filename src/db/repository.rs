use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;

use crate::models::habit::{DEFAULT_CATEGORY, DEFAULT_COLOR, DEFAULT_ICON};
use crate::models::record::{format_date, parse_date};
use crate::models::{
    Achievement, AchievementProgress, CriteriaType, Frequency, Habit, HabitRecord, HabitUpdate,
    HabitWithRecords, NewHabit, User, UserSummary,
};
use crate::tracking::{achievements, current_streak};

// ─── Users ───────────────────────────────────────────────────────────────────

pub struct UserRepo;

impl UserRepo {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            created_at: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        })
    }

    pub fn create(conn: &Connection, name: &str, email: &str) -> Result<User> {
        conn.execute(
            "INSERT INTO users (name, email) VALUES (?1, ?2)",
            params![name, email],
        )?;
        let id = conn.last_insert_rowid();
        debug!("created user {} <{}>", id, email);
        Self::get(conn, id)?.ok_or_else(|| anyhow!("User {} vanished after insert", id))
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<User>> {
        conn.query_row(
            "SELECT id, name, email, created_at FROM users WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn get_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
        conn.query_row(
            "SELECT id, name, email, created_at FROM users WHERE lower(email) = lower(?1)",
            params![email],
            Self::from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn first(conn: &Connection) -> Result<Option<User>> {
        conn.query_row(
            "SELECT id, name, email, created_at FROM users ORDER BY id LIMIT 1",
            [],
            Self::from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn rename(conn: &Connection, id: i64, name: &str) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE users SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        Ok(changed > 0)
    }

    pub fn summary(conn: &Connection, id: i64, today: NaiveDate) -> Result<Option<UserSummary>> {
        let Some(user) = Self::get(conn, id)? else {
            return Ok(None);
        };
        let active_habits: u32 = conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE user_id = ?1 AND is_active = 1",
            params![id],
            |row| row.get(0),
        )?;
        // Seven calendar days including today
        let since = today - Duration::days(6);
        let recent_completions =
            RecordRepo::count_completed_between(conn, id, since, today)?;
        Ok(Some(UserSummary {
            user,
            active_habits,
            recent_completions,
        }))
    }
}

// ─── Habits ──────────────────────────────────────────────────────────────────

const HABIT_COLUMNS: &str =
    "id, user_id, name, description, category, frequency, color, icon, is_active, created_at";

type HabitRow = (
    i64,
    i64,
    String,
    Option<String>,
    String,
    String,
    String,
    String,
    i32,
    Option<String>,
);

fn habit_row(row: &Row<'_>) -> rusqlite::Result<HabitRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn habit_from_row(raw: HabitRow) -> Result<Habit> {
    let (id, user_id, name, description, category, frequency, color, icon, is_active, created_at) =
        raw;
    Ok(Habit {
        id,
        user_id,
        name,
        description,
        category,
        frequency: Frequency::from_str(&frequency)?,
        color,
        icon,
        is_active: is_active != 0,
        created_at: created_at.unwrap_or_default(),
    })
}

pub struct HabitRepo;

impl HabitRepo {
    pub fn create(conn: &Connection, user_id: i64, new: &NewHabit) -> Result<Habit> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Habit name is required"));
        }
        let category = new
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        conn.execute(
            "INSERT INTO habits (user_id, name, description, category, frequency, color, icon, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)",
            params![
                user_id,
                name,
                new.description.as_deref().unwrap_or(""),
                category,
                new.frequency.unwrap_or_default().as_str(),
                new.color.as_deref().unwrap_or(DEFAULT_COLOR),
                new.icon.as_deref().unwrap_or(DEFAULT_ICON),
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("created habit {} '{}' for user {}", id, name, user_id);
        Self::get(conn, user_id, id)?.ok_or_else(|| anyhow!("Habit {} vanished after insert", id))
    }

    pub fn get(conn: &Connection, user_id: i64, id: i64) -> Result<Option<Habit>> {
        let raw = conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
                habit_row,
            )
            .optional()?;
        raw.map(habit_from_row).transpose()
    }

    /// Look a habit up by numeric id or, failing that, by case-insensitive name.
    /// Active habits win over archived ones with the same name.
    pub fn find(conn: &Connection, user_id: i64, key: &str) -> Result<Option<Habit>> {
        if let Ok(id) = key.trim().parse::<i64>() {
            if let Some(habit) = Self::get(conn, user_id, id)? {
                return Ok(Some(habit));
            }
        }
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {HABIT_COLUMNS} FROM habits
                     WHERE user_id = ?1 AND lower(name) = lower(?2)
                     ORDER BY is_active DESC, id DESC LIMIT 1"
                ),
                params![user_id, key.trim()],
                habit_row,
            )
            .optional()?;
        raw.map(habit_from_row).transpose()
    }

    pub fn list(conn: &Connection, user_id: i64, include_inactive: bool) -> Result<Vec<Habit>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits
             WHERE user_id = ?1 AND (?2 = 1 OR is_active = 1)
             ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![user_id, include_inactive as i32], habit_row)?;

        let mut result = Vec::new();
        for r in rows {
            result.push(habit_from_row(r?)?);
        }
        Ok(result)
    }

    pub fn update(conn: &Connection, user_id: i64, id: i64, update: &HabitUpdate) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE habits SET
                name        = COALESCE(?1, name),
                description = COALESCE(?2, description),
                category    = COALESCE(?3, category),
                frequency   = COALESCE(?4, frequency),
                color       = COALESCE(?5, color),
                icon        = COALESCE(?6, icon),
                is_active   = COALESCE(?7, is_active),
                updated_at  = datetime('now')
             WHERE id = ?8 AND user_id = ?9",
            params![
                update.name.as_deref().map(str::trim).filter(|n| !n.is_empty()),
                update.description,
                update.category,
                update.frequency.map(|f| f.as_str()),
                update.color,
                update.icon,
                update.is_active.map(|a| a as i32),
                id,
                user_id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Soft delete; records stay in place.
    pub fn deactivate(conn: &Connection, user_id: i64, id: i64) -> Result<bool> {
        Self::update(
            conn,
            user_id,
            id,
            &HabitUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
    }

    /// Active habits with their records dated in `since..=until`.
    pub fn list_with_records(
        conn: &Connection,
        user_id: i64,
        since: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<HabitWithRecords>> {
        Self::list(conn, user_id, false)?
            .into_iter()
            .map(|habit| {
                let records = RecordRepo::for_habit(conn, habit.id, since, until)?;
                Ok(HabitWithRecords::new(habit, records))
            })
            .collect()
    }
}

// ─── Records ─────────────────────────────────────────────────────────────────

const RECORD_COLUMNS: &str = "id, habit_id, user_id, date, completed, notes";

type RecordRow = (i64, i64, i64, String, i32, Option<String>);

fn record_row(row: &Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn record_from_row(raw: RecordRow) -> Result<HabitRecord> {
    let (id, habit_id, user_id, date, completed, notes) = raw;
    Ok(HabitRecord {
        id: Some(id),
        habit_id,
        user_id,
        date: parse_date(&date)?,
        completed: completed != 0,
        notes,
    })
}

pub struct RecordRepo;

impl RecordRepo {
    /// Set the completion state of `habit` on `date`, creating the row if needed.
    /// `notes` of `None` keeps whatever note is already stored.
    pub fn upsert(
        conn: &Connection,
        habit: &Habit,
        date: NaiveDate,
        completed: bool,
        notes: Option<&str>,
    ) -> Result<()> {
        conn.execute(
            "INSERT INTO habit_records (habit_id, user_id, date, completed, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(habit_id, date) DO UPDATE SET
                completed = ?4,
                notes = COALESCE(?5, notes)",
            params![habit.id, habit.user_id, format_date(date), completed as i32, notes],
        )?;
        debug!(
            "habit {} on {} -> {}",
            habit.id,
            date,
            if completed { "done" } else { "not done" }
        );
        Ok(())
    }

    pub fn get(conn: &Connection, habit_id: i64, date: NaiveDate) -> Result<Option<HabitRecord>> {
        let raw = conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM habit_records WHERE habit_id = ?1 AND date = ?2"),
                params![habit_id, format_date(date)],
                record_row,
            )
            .optional()?;
        raw.map(record_from_row).transpose()
    }

    /// Flip today's state: a missing or uncompleted record becomes completed.
    pub fn toggle(conn: &Connection, habit: &Habit, date: NaiveDate) -> Result<bool> {
        let was_done = Self::get(conn, habit.id, date)?
            .map(|r| r.completed)
            .unwrap_or(false);
        Self::upsert(conn, habit, date, !was_done, None)?;
        Ok(!was_done)
    }

    pub fn for_habit(
        conn: &Connection,
        habit_id: i64,
        since: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<HabitRecord>> {
        let since = since.map(format_date).unwrap_or_else(|| "0000-01-01".to_string());
        let until = until.map(format_date).unwrap_or_else(|| "9999-12-31".to_string());
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM habit_records
             WHERE habit_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date DESC"
        ))?;
        let rows = stmt.query_map(params![habit_id, since, until], record_row)?;

        let mut result = Vec::new();
        for r in rows {
            result.push(record_from_row(r?)?);
        }
        Ok(result)
    }

    pub fn recent(conn: &Connection, habit_id: i64, limit: u32) -> Result<Vec<HabitRecord>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM habit_records
             WHERE habit_id = ?1 ORDER BY date DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![habit_id, limit], record_row)?;

        let mut result = Vec::new();
        for r in rows {
            result.push(record_from_row(r?)?);
        }
        Ok(result)
    }

    /// Completed records of active habits dated on or before `today`.
    pub fn count_completed(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<u32> {
        conn.query_row(
            "SELECT COUNT(*) FROM habit_records r
             JOIN habits h ON h.id = r.habit_id
             WHERE r.user_id = ?1 AND r.completed = 1 AND h.is_active = 1 AND r.date <= ?2",
            params![user_id, format_date(today)],
            |row| row.get(0),
        )
        .map_err(anyhow::Error::from)
    }

    pub fn count_completed_between(
        conn: &Connection,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u32> {
        conn.query_row(
            "SELECT COUNT(*) FROM habit_records
             WHERE user_id = ?1 AND completed = 1 AND date >= ?2 AND date <= ?3",
            params![user_id, format_date(start), format_date(end)],
            |row| row.get(0),
        )
        .map_err(anyhow::Error::from)
    }
}

// ─── Achievements ────────────────────────────────────────────────────────────

pub struct AchievementRepo;

impl AchievementRepo {
    pub fn definitions(conn: &Connection) -> Result<Vec<Achievement>> {
        let mut stmt = conn.prepare(
            "SELECT id, key, title, description, icon, criteria_type, criteria_value
             FROM achievements ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, u32>(6)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, key, title, description, icon, criteria_type, criteria_value) = r?;
            result.push(Achievement {
                id,
                key,
                title,
                description,
                icon,
                criteria_type: CriteriaType::from_str(&criteria_type)?,
                criteria_value,
            });
        }
        Ok(result)
    }

    /// Recompute progress for every achievement. Unlocks are sticky and keep
    /// their first timestamp.
    pub fn refresh(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<Vec<AchievementProgress>> {
        let habits = HabitRepo::list_with_records(conn, user_id, None, Some(today))?;
        let best_streak = habits
            .iter()
            .map(|h| current_streak(&h.records, today))
            .max()
            .unwrap_or(0);
        let total = RecordRepo::count_completed(conn, user_id, today)?;

        for achievement in Self::definitions(conn)? {
            let (progress, unlocked) = achievements::evaluate(&achievement, best_streak, total);
            conn.execute(
                "INSERT INTO achievement_progress (user_id, achievement_id, progress, unlocked, unlocked_at)
                 VALUES (?1, ?2, ?3, ?4, CASE WHEN ?4 = 1 THEN datetime('now') END)
                 ON CONFLICT(user_id, achievement_id) DO UPDATE SET
                    progress    = excluded.progress,
                    unlocked    = MAX(unlocked, excluded.unlocked),
                    unlocked_at = COALESCE(unlocked_at, excluded.unlocked_at)",
                params![user_id, achievement.id, progress, unlocked as i32],
            )?;
        }
        debug!("achievements refreshed for user {} (streak {}, total {})", user_id, best_streak, total);
        Self::progress(conn, user_id)
    }

    pub fn progress(conn: &Connection, user_id: i64) -> Result<Vec<AchievementProgress>> {
        let definitions = Self::definitions(conn)?;
        let mut stmt = conn.prepare(
            "SELECT achievement_id, progress, unlocked, unlocked_at
             FROM achievement_progress WHERE user_id = ?1
             ORDER BY unlocked DESC, achievement_id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, i32>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (achievement_id, progress, unlocked, unlocked_at) = r?;
            let achievement = definitions
                .iter()
                .find(|a| a.id == achievement_id)
                .cloned()
                .ok_or_else(|| anyhow!("Unknown achievement id {}", achievement_id))?;
            result.push(AchievementProgress {
                achievement,
                progress,
                unlocked: unlocked != 0,
                unlocked_at,
            });
        }
        Ok(result)
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
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

    fn new_habit(name: &str) -> NewHabit {
        NewHabit {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn created_habit_gets_defaults() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Drink Water")).unwrap();
        assert_eq!(habit.category, DEFAULT_CATEGORY);
        assert_eq!(habit.color, DEFAULT_COLOR);
        assert_eq!(habit.icon, DEFAULT_ICON);
        assert_eq!(habit.frequency, Frequency::Daily);
        assert!(habit.is_active);
    }

    #[test]
    fn blank_name_is_rejected() {
        let (conn, user) = setup();
        assert!(HabitRepo::create(&conn, user.id, &new_habit("   ")).is_err());
    }

    #[test]
    fn find_by_id_or_name() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Morning Exercise")).unwrap();
        let by_id = HabitRepo::find(&conn, user.id, &habit.id.to_string()).unwrap().unwrap();
        let by_name = HabitRepo::find(&conn, user.id, "morning exercise").unwrap().unwrap();
        assert_eq!(by_id.id, habit.id);
        assert_eq!(by_name.id, habit.id);
        assert!(HabitRepo::find(&conn, user.id, "nope").unwrap().is_none());
    }

    #[test]
    fn habits_are_scoped_to_their_user() {
        let (conn, user) = setup();
        let other = UserRepo::create(&conn, "Other", "other@habitai.com").unwrap();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Read")).unwrap();
        assert!(HabitRepo::get(&conn, other.id, habit.id).unwrap().is_none());
        assert!(HabitRepo::list(&conn, other.id, true).unwrap().is_empty());
        assert!(!HabitRepo::deactivate(&conn, other.id, habit.id).unwrap());
    }

    #[test]
    fn partial_update_and_soft_delete() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Read")).unwrap();
        let update = HabitUpdate {
            color: Some("#10B981".to_string()),
            frequency: Some(Frequency::Weekly),
            ..Default::default()
        };
        assert!(HabitRepo::update(&conn, user.id, habit.id, &update).unwrap());
        let updated = HabitRepo::get(&conn, user.id, habit.id).unwrap().unwrap();
        assert_eq!(updated.name, "Read");
        assert_eq!(updated.color, "#10B981");
        assert_eq!(updated.frequency, Frequency::Weekly);

        assert!(HabitRepo::deactivate(&conn, user.id, habit.id).unwrap());
        assert!(HabitRepo::list(&conn, user.id, false).unwrap().is_empty());
        assert_eq!(HabitRepo::list(&conn, user.id, true).unwrap().len(), 1);
    }

    #[test]
    fn upsert_keeps_one_record_per_day() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Read")).unwrap();
        let today = day(2024, 6, 30);

        RecordRepo::upsert(&conn, &habit, today, true, Some("Done!")).unwrap();
        RecordRepo::upsert(&conn, &habit, today, false, None).unwrap();

        let records = RecordRepo::for_habit(&conn, habit.id, None, None).unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].completed);
        assert_eq!(records[0].notes.as_deref(), Some("Done!"));
    }

    #[test]
    fn toggle_flips_state() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Read")).unwrap();
        let today = day(2024, 6, 30);
        assert!(RecordRepo::toggle(&conn, &habit, today).unwrap());
        assert!(!RecordRepo::toggle(&conn, &habit, today).unwrap());
        assert!(RecordRepo::toggle(&conn, &habit, today).unwrap());
    }

    #[test]
    fn records_are_filtered_by_range_newest_first() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Read")).unwrap();
        for d in 1..=10 {
            RecordRepo::upsert(&conn, &habit, day(2024, 6, d), true, None).unwrap();
        }
        let records =
            RecordRepo::for_habit(&conn, habit.id, Some(day(2024, 6, 3)), Some(day(2024, 6, 5)))
                .unwrap();
        let dates: Vec<_> = records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2024, 6, 5), day(2024, 6, 4), day(2024, 6, 3)]);

        let recent = RecordRepo::recent(&conn, habit.id, 2).unwrap();
        assert_eq!(recent[0].date, day(2024, 6, 10));
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn malformed_stored_date_is_an_error() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Read")).unwrap();
        conn.execute(
            "INSERT INTO habit_records (habit_id, user_id, date, completed) VALUES (?1, ?2, 'soon', 1)",
            params![habit.id, user.id],
        )
        .unwrap();
        assert!(RecordRepo::for_habit(&conn, habit.id, None, None).is_err());
    }

    #[test]
    fn user_summary_counts_recent_completions() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Read")).unwrap();
        let today = day(2024, 6, 30);
        RecordRepo::upsert(&conn, &habit, today, true, None).unwrap();
        RecordRepo::upsert(&conn, &habit, day(2024, 6, 1), true, None).unwrap();

        let summary = UserRepo::summary(&conn, user.id, today).unwrap().unwrap();
        assert_eq!(summary.active_habits, 1);
        assert_eq!(summary.recent_completions, 1);
        assert!(UserRepo::rename(&conn, user.id, "Renamed").unwrap());
        assert_eq!(UserRepo::get(&conn, user.id).unwrap().unwrap().name, "Renamed");
    }

    #[test]
    fn user_summary_window_is_seven_days_including_today() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Read")).unwrap();
        let today = day(2024, 6, 30);
        for offset in 0..8 {
            RecordRepo::upsert(&conn, &habit, today - Duration::days(offset), true, None).unwrap();
        }

        let summary = UserRepo::summary(&conn, user.id, today).unwrap().unwrap();
        assert_eq!(summary.recent_completions, 7);
    }

    #[test]
    fn completion_count_ignores_future_records() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Read")).unwrap();
        let today = day(2024, 6, 30);
        RecordRepo::upsert(&conn, &habit, today, true, None).unwrap();
        RecordRepo::upsert(&conn, &habit, day(2024, 7, 2), true, None).unwrap();

        assert_eq!(RecordRepo::count_completed(&conn, user.id, today).unwrap(), 1);
        assert_eq!(RecordRepo::count_completed(&conn, user.id, day(2024, 7, 2)).unwrap(), 2);
    }

    #[test]
    fn achievements_unlock_and_stay_unlocked() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &new_habit("Read")).unwrap();
        let today = day(2024, 6, 30);
        for offset in 0..7 {
            RecordRepo::upsert(&conn, &habit, today - Duration::days(offset), true, None).unwrap();
        }

        let progress = AchievementRepo::refresh(&conn, user.id, today).unwrap();
        let unlocked: Vec<_> = progress
            .iter()
            .filter(|p| p.unlocked)
            .map(|p| p.achievement.key.as_str())
            .collect();
        assert_eq!(unlocked, vec!["first_step", "week_warrior"]);
        assert!(progress[0].unlocked_at.is_some());

        // A week later the streak is gone but the badge remains.
        let later = today + Duration::days(7);
        let progress = AchievementRepo::refresh(&conn, user.id, later).unwrap();
        let week = progress
            .iter()
            .find(|p| p.achievement.key == "week_warrior")
            .unwrap();
        assert!(week.unlocked);
        assert_eq!(week.progress, 0);
    }

    #[test]
    fn meta_round_trip() {
        let (conn, _) = setup();
        assert_eq!(MetaRepo::get(&conn, "setup_done").unwrap(), None);
        MetaRepo::set(&conn, "setup_done", "1").unwrap();
        assert_eq!(MetaRepo::get(&conn, "setup_done").unwrap().as_deref(), Some("1"));
    }
}
