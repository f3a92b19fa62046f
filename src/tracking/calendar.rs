use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

use crate::models::{DayCell, HabitDayStatus, HabitWithRecords, MonthGrid};
use crate::tracking::completed_on;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid month {month} for year {year}, expected 1-12")]
    InvalidMonth { year: i32, month: u32 },
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, CalendarError> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let next = next.ok_or(CalendarError::InvalidMonth { year, month })?;
    Ok((next - first).num_days() as u32)
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidMonth { year, month })
}

/// Build a Sunday-first grid of whole weeks covering `year`-`month`.
///
/// Cells before the 1st and after the last day belong to the neighbouring
/// months and carry no habit data. `month` must already be in 1..=12.
pub fn build_month(
    year: i32,
    month: u32,
    habits: &[HabitWithRecords],
    today: NaiveDate,
) -> Result<MonthGrid, CalendarError> {
    let first = first_of_month(year, month)?;
    let month_len = i64::from(days_in_month(year, month)?);
    let start_offset = i64::from(first.weekday().num_days_from_sunday());
    let total_cells = (start_offset + month_len + 6) / 7 * 7;

    let days = (0..total_cells)
        .map(|i| {
            let day_of_month = i - start_offset + 1;
            let date = first + Duration::days(i - start_offset);
            let is_current_month = (1..=month_len).contains(&day_of_month);

            let habits = if is_current_month {
                habits
                    .iter()
                    .map(|h| HabitDayStatus {
                        id: h.habit.id,
                        name: h.habit.name.clone(),
                        completed: completed_on(&h.records, date),
                        color: h.habit.color.clone(),
                        icon: h.habit.icon.clone(),
                    })
                    .collect()
            } else {
                Vec::new()
            };

            DayCell {
                date,
                is_current_month,
                is_today: date == today,
                habits,
            }
        })
        .collect();

    Ok(MonthGrid { year, month, days })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, Habit, HabitRecord};
    use crate::tracking::{current_streak, day};

    fn habit(id: i64, name: &str, records: Vec<HabitRecord>) -> HabitWithRecords {
        HabitWithRecords::new(
            Habit {
                id,
                user_id: 1,
                name: name.to_string(),
                description: None,
                category: "Health".to_string(),
                frequency: Frequency::Daily,
                color: "#10B981".to_string(),
                icon: "🏃".to_string(),
                is_active: true,
                created_at: "2024-01-01 00:00:00".to_string(),
            },
            records,
        )
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2023, 2).unwrap(), 28);
        assert_eq!(days_in_month(1900, 2).unwrap(), 28);
        assert_eq!(days_in_month(2000, 2).unwrap(), 29);
        assert_eq!(days_in_month(2024, 4).unwrap(), 30);
        assert_eq!(days_in_month(2024, 12).unwrap(), 31);
    }

    #[test]
    fn february_2024_spans_five_weeks() {
        let grid = build_month(2024, 2, &[], day(2024, 6, 1)).unwrap();
        assert_eq!(grid.days.len(), 35);
        // Feb 1 2024 is a Thursday.
        assert!(grid.days[..4].iter().all(|c| !c.is_current_month));
        assert_eq!(grid.days[4].date, day(2024, 2, 1));
        assert_eq!(grid.days[0].date, day(2024, 1, 28));
        assert_eq!(grid.days[32].date, day(2024, 2, 29));
        assert_eq!(grid.days[34].date, day(2024, 3, 2));
        assert_eq!(grid.days.iter().filter(|c| c.is_current_month).count(), 29);
    }

    #[test]
    fn every_month_renders_whole_weeks() {
        let today = day(2024, 6, 15);
        for year in [1999, 2000, 2023, 2024, 2100] {
            for month in 1..=12 {
                let grid = build_month(year, month, &[], today).unwrap();
                let len = days_in_month(year, month).unwrap() as usize;
                assert_eq!(grid.days.len() % 7, 0, "{year}-{month}");
                assert!(grid.days.len() >= len, "{year}-{month}");
                assert_eq!(grid.days[0].date.weekday(), chrono::Weekday::Sun);
            }
        }
    }

    #[test]
    fn padding_rolls_into_adjacent_years() {
        // Dec 1 2024 is a Sunday; Jan 1 2025 starts the trailing padding.
        let grid = build_month(2024, 12, &[], day(2024, 12, 1)).unwrap();
        assert_eq!(grid.days[0].date, day(2024, 12, 1));
        assert_eq!(grid.days.len(), 35);
        assert_eq!(grid.days[31].date, day(2025, 1, 1));
        assert!(!grid.days[31].is_current_month);

        let grid = build_month(2025, 1, &[], day(2025, 1, 1)).unwrap();
        assert_eq!(grid.days[0].date, day(2024, 12, 29));
    }

    #[test]
    fn exactly_one_cell_is_today_within_the_month() {
        let today = day(2024, 2, 14);
        let grid = build_month(2024, 2, &[], today).unwrap();
        let todays: Vec<_> = grid.days.iter().filter(|c| c.is_today).collect();
        assert_eq!(todays.len(), 1);
        assert_eq!(todays[0].date, today);
    }

    #[test]
    fn no_cell_is_today_for_other_months() {
        let grid = build_month(2024, 5, &[], day(2024, 2, 14)).unwrap();
        assert!(grid.days.iter().all(|c| !c.is_today));
    }

    #[test]
    fn today_in_padding_is_flagged_without_habits() {
        // Mar 2 2024 falls in the trailing padding of February.
        let habits = vec![habit(1, "Read", vec![HabitRecord::new(day(2024, 3, 2), true)])];
        let grid = build_month(2024, 2, &habits, day(2024, 3, 2)).unwrap();
        let cell = grid.days.iter().find(|c| c.is_today).unwrap();
        assert!(!cell.is_current_month);
        assert!(cell.habits.is_empty());
    }

    #[test]
    fn completion_is_attached_per_habit() {
        let today = day(2024, 2, 14);
        let habits = vec![
            habit(1, "Run", vec![HabitRecord::new(today, true)]),
            habit(2, "Read", vec![HabitRecord::new(today, false)]),
        ];
        let grid = build_month(2024, 2, &habits, today).unwrap();
        let cell = grid.days.iter().find(|c| c.date == today).unwrap();
        assert_eq!(cell.habits.len(), 2);
        assert_eq!(cell.habits[0].id, 1);
        assert!(cell.habits[0].completed);
        assert!(!cell.habits[1].completed);
        assert_eq!(cell.completed_count(), 1);

        let other = grid.days.iter().find(|c| c.date == day(2024, 2, 13)).unwrap();
        assert_eq!(other.habits.len(), 2);
        assert!(other.habits.iter().all(|h| !h.completed));
    }

    #[test]
    fn single_completion_today_shows_in_streak_and_grid() {
        let today = day(2024, 2, 14);
        let records = vec![HabitRecord::new(today, true)];
        assert_eq!(current_streak(&records, today), 1);

        let grid = build_month(2024, 2, &[habit(7, "Meditate", records)], today).unwrap();
        let cell = grid.days.iter().find(|c| c.is_today).unwrap();
        assert!(cell.habits[0].completed);
    }

    #[test]
    fn out_of_range_month_is_rejected() {
        let today = day(2024, 2, 14);
        assert_eq!(
            build_month(2024, 13, &[], today),
            Err(CalendarError::InvalidMonth { year: 2024, month: 13 })
        );
        assert!(build_month(2024, 0, &[], today).is_err());
    }

    #[test]
    fn grid_serialises_with_camel_case_keys() {
        let today = day(2024, 2, 14);
        let grid = build_month(2024, 2, &[habit(1, "Run", vec![])], today).unwrap();
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["year"], 2024);
        assert_eq!(json["month"], 2);
        let cell = &json["days"][4];
        assert_eq!(cell["date"], "2024-02-01");
        assert_eq!(cell["isCurrentMonth"], true);
        assert_eq!(cell["isToday"], false);
        assert_eq!(cell["habits"][0]["name"], "Run");
        assert_eq!(cell["habits"][0]["completed"], false);
    }
}
