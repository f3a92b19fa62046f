use chrono::NaiveDate;

use crate::models::HabitRecord;

/// Consecutive completed days ending at `today`.
///
/// A single missing day ends the run. Records for a day that was already
/// counted are skipped. A record dated after `today` stops the walk.
pub fn current_streak(records: &[HabitRecord], today: NaiveDate) -> u32 {
    let mut dates: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.completed)
        .map(|r| r.date)
        .collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));

    let mut streak = 0u32;
    for date in dates {
        let diff = (today - date).num_days();
        if diff < 0 {
            break;
        }
        let expected = i64::from(streak);
        if diff == expected {
            streak += 1;
        } else if diff > expected {
            break;
        }
    }
    streak
}

/// Longest run of consecutive completed days anywhere in the history.
pub fn longest_streak(records: &[HabitRecord]) -> u32 {
    let mut dates: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.completed)
        .map(|r| r.date)
        .collect();
    if dates.is_empty() {
        return 0;
    }
    dates.sort_unstable();
    dates.dedup();

    let mut best = 1u32;
    let mut current = 1u32;
    for pair in dates.windows(2) {
        if pair[0].succ_opt() == Some(pair[1]) {
            current += 1;
        } else {
            current = 1;
        }
        best = best.max(current);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::day;
    use chrono::Duration;

    fn done(date: NaiveDate) -> HabitRecord {
        HabitRecord::new(date, true)
    }

    fn distinct_completed(records: &[HabitRecord]) -> usize {
        let mut dates: Vec<_> = records.iter().filter(|r| r.completed).map(|r| r.date).collect();
        dates.sort();
        dates.dedup();
        dates.len()
    }

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(current_streak(&[], day(2024, 6, 1)), 0);
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn today_only_counts_one() {
        let today = day(2024, 6, 1);
        assert_eq!(current_streak(&[done(today)], today), 1);
    }

    #[test]
    fn today_and_yesterday_count_two() {
        let today = day(2024, 6, 1);
        let records = vec![done(today - Duration::days(1)), done(today)];
        assert_eq!(current_streak(&records, today), 2);
    }

    #[test]
    fn gap_truncates_the_chain() {
        let today = day(2024, 6, 1);
        let records = vec![done(today), done(today - Duration::days(3))];
        assert_eq!(current_streak(&records, today), 1);
    }

    #[test]
    fn nothing_today_or_yesterday_is_zero() {
        let today = day(2024, 6, 1);
        let records = vec![
            done(today - Duration::days(2)),
            done(today - Duration::days(3)),
        ];
        assert_eq!(current_streak(&records, today), 0);
    }

    #[test]
    fn yesterday_alone_does_not_start_a_streak() {
        let today = day(2024, 6, 1);
        assert_eq!(current_streak(&[done(today - Duration::days(1))], today), 0);
    }

    #[test]
    fn uncompleted_records_are_ignored() {
        let today = day(2024, 6, 1);
        let records = vec![
            done(today),
            HabitRecord::new(today - Duration::days(1), false),
            done(today - Duration::days(2)),
        ];
        assert_eq!(current_streak(&records, today), 1);
    }

    #[test]
    fn duplicate_days_are_skipped() {
        let today = day(2024, 6, 1);
        let records = vec![
            done(today),
            done(today),
            done(today - Duration::days(1)),
            done(today - Duration::days(1)),
            done(today - Duration::days(2)),
        ];
        assert_eq!(current_streak(&records, today), 3);
    }

    #[test]
    fn future_record_stops_the_walk() {
        let today = day(2024, 6, 1);
        let records = vec![done(today + Duration::days(1)), done(today)];
        assert_eq!(current_streak(&records, today), 0);
    }

    #[test]
    fn input_order_does_not_matter_and_result_is_stable() {
        let today = day(2024, 1, 2);
        let records = vec![
            done(day(2023, 12, 31)),
            done(today),
            done(day(2024, 1, 1)),
        ];
        let first = current_streak(&records, today);
        assert_eq!(first, 3);
        assert_eq!(current_streak(&records, today), first);
    }

    #[test]
    fn streak_never_exceeds_distinct_completed_days() {
        let today = day(2024, 6, 30);
        let mut records = Vec::new();
        for offset in [0, 0, 1, 2, 2, 4, 5, 9] {
            records.push(done(today - Duration::days(offset)));
            let streak = current_streak(&records, today) as usize;
            assert!(streak <= distinct_completed(&records));
        }
    }

    #[test]
    fn longest_run_spans_month_boundaries() {
        let records = vec![
            done(day(2024, 2, 27)),
            done(day(2024, 2, 28)),
            done(day(2024, 2, 29)),
            done(day(2024, 3, 1)),
            done(day(2024, 3, 5)),
            done(day(2024, 3, 6)),
        ];
        assert_eq!(longest_streak(&records), 4);
    }

    #[test]
    fn longest_run_ignores_duplicates() {
        let records = vec![
            done(day(2024, 3, 1)),
            done(day(2024, 3, 1)),
            done(day(2024, 3, 2)),
        ];
        assert_eq!(longest_streak(&records), 2);
    }
}
