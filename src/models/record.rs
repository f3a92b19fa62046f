use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("date {0} is in the future")]
    FutureDate(NaiveDate),
}

/// One dated completion observation for a habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRecord {
    pub id: Option<i64>,
    pub habit_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
}

#[cfg(test)]
impl HabitRecord {
    /// A bare record, used where only `date` and `completed` matter.
    pub fn new(date: NaiveDate, completed: bool) -> Self {
        Self {
            id: None,
            habit_id: 0,
            user_id: 0,
            date,
            completed,
            notes: None,
        }
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, RecordError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| RecordError::InvalidDate(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a user-supplied completion date, refusing dates after `today`.
pub fn parse_completion_date(s: &str, today: NaiveDate) -> Result<NaiveDate, RecordError> {
    let date = parse_date(s)?;
    if date > today {
        return Err(RecordError::FutureDate(date));
    }
    Ok(date)
}
