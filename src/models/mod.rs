pub mod achievement;
pub mod calendar;
pub mod habit;
pub mod insight;
pub mod record;
pub mod stats;
pub mod user;

pub use achievement::{Achievement, AchievementProgress, CriteriaType};
pub use calendar::{DayCell, HabitDayStatus, MonthGrid};
pub use habit::{Frequency, Habit, HabitUpdate, HabitWithRecords, NewHabit};
pub use insight::{HabitSuggestion, HabitSummary};
pub use record::HabitRecord;
pub use stats::{DailyProgress, DashboardStats, HabitAnalytics, HabitStats, Streak, TrendDirection};
pub use user::{User, UserSummary};
