use chrono::{Duration, NaiveDate};

use crate::models::{
    DailyProgress, DashboardStats, HabitAnalytics, HabitRecord, HabitStats, HabitSummary,
    HabitWithRecords, TrendDirection,
};
use crate::tracking::{completed_on, current_streak, longest_streak};

/// Records dated within the `window_days` days ending at `today`.
fn in_window(records: &[HabitRecord], today: NaiveDate, window_days: u32) -> Vec<&HabitRecord> {
    let start = today - Duration::days(i64::from(window_days.max(1)) - 1);
    records
        .iter()
        .filter(|r| r.date >= start && r.date <= today)
        .collect()
}

fn completed_days_between(records: &[HabitRecord], start: NaiveDate, end: NaiveDate) -> u32 {
    let mut dates: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.completed && r.date >= start && r.date <= end)
        .map(|r| r.date)
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates.len() as u32
}

pub fn habit_stats(habit: &HabitWithRecords, today: NaiveDate, window_days: u32) -> HabitStats {
    let window = in_window(&habit.records, today, window_days);
    let total_completed = window.iter().filter(|r| r.completed).count() as u32;
    let completion_rate = if window.is_empty() {
        0.0
    } else {
        total_completed as f64 / window.len() as f64 * 100.0
    };

    HabitStats {
        current_streak: current_streak(&habit.records, today),
        completion_rate,
        total_completed,
        today_completed: completed_on(&habit.records, today),
    }
}

pub fn habit_analytics(
    habit: &HabitWithRecords,
    today: NaiveDate,
    window_days: u32,
) -> HabitAnalytics {
    let window_days = window_days.max(1);
    let start = today - Duration::days(i64::from(window_days) - 1);
    let completed_days = completed_days_between(&habit.records, start, today);

    let last_week = completed_days_between(&habit.records, today - Duration::days(6), today);
    let prior_week = completed_days_between(
        &habit.records,
        today - Duration::days(13),
        today - Duration::days(7),
    );
    let trend_direction = match last_week.cmp(&prior_week) {
        std::cmp::Ordering::Greater => TrendDirection::Up,
        std::cmp::Ordering::Less => TrendDirection::Down,
        std::cmp::Ordering::Equal => TrendDirection::Stable,
    };

    HabitAnalytics {
        habit_id: habit.habit.id,
        habit_name: habit.habit.name.clone(),
        total_days: window_days,
        completed_days,
        completion_rate: completed_days as f64 / window_days as f64 * 100.0,
        current_streak: current_streak(&habit.records, today),
        longest_streak: longest_streak(&habit.records),
        average_per_week: completed_days as f64 / (window_days as f64 / 7.0),
        trend_direction,
    }
}

pub fn dashboard(habits: &[HabitWithRecords], today: NaiveDate, window_days: u32) -> DashboardStats {
    let stats: Vec<HabitStats> = habits
        .iter()
        .map(|h| habit_stats(h, today, window_days))
        .collect();

    let weekly_progress = (0..7)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            DailyProgress {
                day: date.format("%a").to_string(),
                date: date.format("%Y-%m-%d").to_string(),
                completed: habits
                    .iter()
                    .filter(|h| completed_on(&h.records, date))
                    .count() as u32,
            }
        })
        .collect();

    let completion_rate = if stats.is_empty() {
        0.0
    } else {
        stats.iter().map(|s| s.completion_rate).sum::<f64>() / stats.len() as f64
    };
    let current_streaks: Vec<u32> = stats.iter().map(|s| s.current_streak).collect();

    DashboardStats {
        total_habits: habits.len() as u32,
        completed_today: stats.iter().filter(|s| s.today_completed).count() as u32,
        longest_streak: current_streaks.iter().copied().max().unwrap_or(0),
        current_streaks,
        weekly_progress,
        completion_rate,
    }
}

/// What the language model gets to see about each habit.
pub fn summarize(habits: &[HabitWithRecords], today: NaiveDate, window_days: u32) -> Vec<HabitSummary> {
    habits
        .iter()
        .map(|h| {
            let window = in_window(&h.records, today, window_days);
            HabitSummary {
                name: h.habit.name.clone(),
                category: h.habit.category.clone(),
                completed_days: window.iter().filter(|r| r.completed).count() as u32,
                total_days: window.len() as u32,
                recent_streak: current_streak(&h.records, today),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, Habit};
    use crate::tracking::day;

    fn habit(id: i64, days_ago: &[(i64, bool)], today: NaiveDate) -> HabitWithRecords {
        let records = days_ago
            .iter()
            .map(|(offset, completed)| HabitRecord::new(today - Duration::days(*offset), *completed))
            .collect();
        HabitWithRecords::new(
            Habit {
                id,
                user_id: 1,
                name: format!("habit {id}"),
                description: None,
                category: "Health".to_string(),
                frequency: Frequency::Daily,
                color: "#3B82F6".to_string(),
                icon: "💪".to_string(),
                is_active: true,
                created_at: "2024-01-01 00:00:00".to_string(),
            },
            records,
        )
    }

    #[test]
    fn stats_rate_counts_recorded_days_only() {
        let today = day(2024, 6, 30);
        let h = habit(1, &[(0, true), (1, true), (2, false), (3, true)], today);
        let stats = habit_stats(&h, today, 30);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.total_completed, 3);
        assert!((stats.completion_rate - 75.0).abs() < f64::EPSILON);
        assert!(stats.today_completed);
    }

    #[test]
    fn stats_ignore_records_outside_the_window() {
        let today = day(2024, 6, 30);
        let h = habit(1, &[(0, true), (45, true)], today);
        let stats = habit_stats(&h, today, 30);
        assert_eq!(stats.total_completed, 1);
        assert!((stats.completion_rate - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stats_without_records_are_zero() {
        let today = day(2024, 6, 30);
        let stats = habit_stats(&habit(1, &[], today), today, 30);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert!(!stats.today_completed);
    }

    #[test]
    fn analytics_trend_compares_the_last_two_weeks() {
        let today = day(2024, 6, 30);
        let improving = habit(1, &[(0, true), (1, true), (2, true), (8, true)], today);
        let a = habit_analytics(&improving, today, 28);
        assert_eq!(a.trend_direction, TrendDirection::Up);
        assert_eq!(a.completed_days, 4);
        assert_eq!(a.current_streak, 3);
        assert_eq!(a.longest_streak, 3);
        assert!((a.average_per_week - 1.0).abs() < f64::EPSILON);

        let slipping = habit(2, &[(3, true), (8, true), (9, true)], today);
        assert_eq!(habit_analytics(&slipping, today, 28).trend_direction, TrendDirection::Down);

        let steady = habit(3, &[(0, true), (7, true)], today);
        assert_eq!(habit_analytics(&steady, today, 28).trend_direction, TrendDirection::Stable);
    }

    #[test]
    fn dashboard_aggregates_habits() {
        let today = day(2024, 6, 30);
        let habits = vec![
            habit(1, &[(0, true), (1, true)], today),
            habit(2, &[(1, true), (2, false)], today),
        ];
        let d = dashboard(&habits, today, 30);
        assert_eq!(d.total_habits, 2);
        assert_eq!(d.completed_today, 1);
        assert_eq!(d.current_streaks, vec![2, 0]);
        assert_eq!(d.longest_streak, 2);
        assert_eq!(d.weekly_progress.len(), 7);
        assert_eq!(d.weekly_progress[6].date, "2024-06-30");
        assert_eq!(d.weekly_progress[6].completed, 1);
        assert_eq!(d.weekly_progress[5].completed, 2);
        assert_eq!(d.total_this_week(), 3);
        assert!((d.completion_rate - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summaries_carry_window_counts() {
        let today = day(2024, 6, 30);
        let habits = vec![habit(1, &[(0, true), (1, false), (40, true)], today)];
        let s = summarize(&habits, today, 30);
        assert_eq!(s[0].completed_days, 1);
        assert_eq!(s[0].total_days, 2);
        assert_eq!(s[0].recent_streak, 1);
    }
}
