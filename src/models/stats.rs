use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
}

/// Per-habit figures shown in the habit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub current_streak: u32,
    /// Percentage of recorded days in the window that were completed.
    pub completion_rate: f64,
    pub total_completed: u32,
    pub today_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            TrendDirection::Up => "↑",
            TrendDirection::Down => "↓",
            TrendDirection::Stable => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitAnalytics {
    pub habit_id: i64,
    pub habit_name: String,
    pub total_days: u32,
    pub completed_days: u32,
    pub completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub average_per_week: f64,
    pub trend_direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProgress {
    /// Short weekday label, e.g. "Mon".
    pub day: String,
    pub date: String,
    pub completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_habits: u32,
    pub completed_today: u32,
    pub current_streaks: Vec<u32>,
    pub weekly_progress: Vec<DailyProgress>,
    pub completion_rate: f64,
    pub longest_streak: u32,
}

impl DashboardStats {
    pub fn total_this_week(&self) -> u32 {
        self.weekly_progress.iter().map(|d| d.completed).sum()
    }
}
