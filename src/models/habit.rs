use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::HabitRecord;

pub const DEFAULT_COLOR: &str = "#3B82F6";
pub const DEFAULT_ICON: &str = "💪";
pub const DEFAULT_CATEGORY: &str = "Personal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            _ => Err(anyhow::anyhow!("Unknown frequency: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    /// Stored for display only; streaks and the calendar treat every habit as daily.
    pub frequency: Frequency,
    pub color: String,
    pub icon: String,
    pub is_active: bool,
    pub created_at: String,
}

/// A habit together with the records loaded for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitWithRecords {
    #[serde(flatten)]
    pub habit: Habit,
    pub records: Vec<HabitRecord>,
}

impl HabitWithRecords {
    pub fn new(habit: Habit, records: Vec<HabitRecord>) -> Self {
        Self { habit, records }
    }
}

/// Fields for a new habit. Absent values fall back to the defaults above.
#[derive(Debug, Clone, Default)]
pub struct NewHabit {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<Frequency>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<Frequency>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

impl HabitUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.frequency.is_none()
            && self.color.is_none()
            && self.icon.is_none()
            && self.is_active.is_none()
    }
}
