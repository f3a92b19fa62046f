use anyhow::Result;
use rusqlite::Connection;

use crate::tracking::achievements::BUILTIN;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            created_at  TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS habits (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      INTEGER NOT NULL REFERENCES users(id),
            name         TEXT NOT NULL,
            description  TEXT,
            category     TEXT NOT NULL,
            frequency    TEXT NOT NULL DEFAULT 'DAILY'
                         CHECK(frequency IN ('DAILY','WEEKLY','MONTHLY')),
            color        TEXT NOT NULL DEFAULT '#3B82F6',
            icon         TEXT NOT NULL DEFAULT '💪',
            is_active    INTEGER NOT NULL DEFAULT 1,
            created_at   TEXT DEFAULT (datetime('now')),
            updated_at   TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS habit_records (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id    INTEGER NOT NULL REFERENCES habits(id),
            user_id     INTEGER NOT NULL REFERENCES users(id),
            date        TEXT NOT NULL,
            completed   INTEGER NOT NULL DEFAULT 0,
            notes       TEXT,
            created_at  TEXT DEFAULT (datetime('now')),
            UNIQUE(habit_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_habit_records_user_date
            ON habit_records(user_id, date);

        CREATE TABLE IF NOT EXISTS achievements (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            key             TEXT NOT NULL UNIQUE,
            title           TEXT NOT NULL,
            description     TEXT,
            icon            TEXT,
            criteria_type   TEXT NOT NULL CHECK(criteria_type IN ('STREAK','TOTAL_COMPLETIONS')),
            criteria_value  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS achievement_progress (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            achievement_id  INTEGER NOT NULL REFERENCES achievements(id),
            progress        INTEGER NOT NULL DEFAULT 0,
            unlocked        INTEGER NOT NULL DEFAULT 0,
            unlocked_at     TEXT,
            UNIQUE(user_id, achievement_id)
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;

    seed_achievements(conn)?;
    Ok(())
}

fn seed_achievements(conn: &Connection) -> Result<()> {
    for (key, title, description, icon, criteria, value) in &BUILTIN {
        conn.execute(
            "INSERT OR IGNORE INTO achievements
                (key, title, description, icon, criteria_type, criteria_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![key, title, description, icon, criteria.as_str(), value],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM achievements", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, BUILTIN.len() as i64);
    }
}
