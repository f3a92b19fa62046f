use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitDayStatus {
    pub id: i64,
    pub name: String,
    pub completed: bool,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    /// Empty for padding cells from adjacent months.
    pub habits: Vec<HabitDayStatus>,
}

impl DayCell {
    pub fn completed_count(&self) -> usize {
        self.habits.iter().filter(|h| h.completed).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayCell>,
}

impl MonthGrid {
    pub fn weeks(&self) -> std::slice::Chunks<'_, DayCell> {
        self.days.chunks(7)
    }
}
