//! Pure computations over habits and records that are already loaded.
//!
//! Nothing in here reads the clock or touches the database: callers pass
//! `today` explicitly and hand over records scoped to a single user.

pub mod achievements;
pub mod analytics;
pub mod calendar;
pub mod streak;

use chrono::NaiveDate;

use crate::models::HabitRecord;

pub use calendar::{build_month, days_in_month};
pub use streak::{current_streak, longest_streak};

/// True when any record for exactly `date` is marked completed.
pub fn completed_on(records: &[HabitRecord], date: NaiveDate) -> bool {
    records.iter().any(|r| r.completed && r.date == date)
}

#[cfg(test)]
pub(crate) fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
