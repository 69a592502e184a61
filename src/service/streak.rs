use chrono::{DateTime, Utc};

/// Per-user activity counters as stored on the `users` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakCounters {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Computes the counters after an activity at `now`.
///
/// Returns `None` when the previous activity falls on the same UTC calendar
/// day, meaning nothing needs to be written. Repeated activity within one day
/// therefore never inflates the streak, and calling this again under retry is
/// harmless.
///
/// Day comparison is by calendar date in UTC, not elapsed duration: an
/// activity at 23:59 followed by one at 00:01 counts as consecutive days.
/// A `last_activity_at` in the future (clock skew) is treated like any other
/// non-adjacent day and resets the streak to 1.
pub fn advance(counters: &StreakCounters, now: DateTime<Utc>) -> Option<StreakCounters> {
    let today = now.date_naive();

    let current_streak = match counters.last_activity_at {
        Some(last) if last.date_naive() == today => return None,
        Some(last) if last.date_naive().succ_opt() == Some(today) => counters.current_streak + 1,
        _ => 1,
    };

    Some(StreakCounters {
        current_streak,
        longest_streak: counters.longest_streak.max(current_streak),
        last_activity_at: Some(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn fresh() -> StreakCounters {
        StreakCounters {
            current_streak: 0,
            longest_streak: 0,
            last_activity_at: None,
        }
    }

    #[test]
    fn first_activity_starts_at_one() {
        let updated = advance(&fresh(), at(2024, 3, 1, 12)).unwrap();
        assert_eq!(updated.current_streak, 1);
        assert_eq!(updated.longest_streak, 1);
        assert_eq!(updated.last_activity_at, Some(at(2024, 3, 1, 12)));
    }

    #[test]
    fn same_day_is_a_no_op() {
        let counters = StreakCounters {
            current_streak: 4,
            longest_streak: 9,
            last_activity_at: Some(at(2024, 3, 1, 8)),
        };
        assert_eq!(advance(&counters, at(2024, 3, 1, 23)), None);
        // And again, later the same day.
        assert_eq!(advance(&counters, at(2024, 3, 1, 23)), None);
    }

    #[test]
    fn consecutive_day_increments() {
        let day1 = advance(&fresh(), at(2024, 3, 1, 12)).unwrap();
        let day2 = advance(&day1, at(2024, 3, 2, 9)).unwrap();
        assert_eq!(day2.current_streak, 2);
        assert_eq!(day2.longest_streak, 2);
    }

    #[test]
    fn midnight_boundary_counts_as_consecutive() {
        let late = StreakCounters {
            current_streak: 1,
            longest_streak: 1,
            last_activity_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap()),
        };
        let updated = advance(&late, Utc.with_ymd_and_hms(2024, 3, 2, 0, 1, 0).unwrap()).unwrap();
        assert_eq!(updated.current_streak, 2);
    }

    #[test]
    fn gap_resets_current_but_preserves_longest() {
        let day1 = advance(&fresh(), at(2024, 3, 1, 12)).unwrap();
        let day2 = advance(&day1, at(2024, 3, 2, 12)).unwrap();
        // Day 3 skipped.
        let day4 = advance(&day2, at(2024, 3, 4, 12)).unwrap();
        assert_eq!(day4.current_streak, 1);
        assert_eq!(day4.longest_streak, 2);
    }

    #[test]
    fn month_boundary_is_adjacent() {
        let counters = StreakCounters {
            current_streak: 3,
            longest_streak: 3,
            last_activity_at: Some(at(2024, 2, 29, 18)),
        };
        let updated = advance(&counters, at(2024, 3, 1, 6)).unwrap();
        assert_eq!(updated.current_streak, 4);
        assert_eq!(updated.longest_streak, 4);
    }

    #[test]
    fn future_last_activity_resets_to_one() {
        // Clock skew: last activity recorded "tomorrow" relative to now.
        let counters = StreakCounters {
            current_streak: 6,
            longest_streak: 6,
            last_activity_at: Some(at(2024, 3, 5, 12)),
        };
        let updated = advance(&counters, at(2024, 3, 4, 12)).unwrap();
        assert_eq!(updated.current_streak, 1);
        assert_eq!(updated.longest_streak, 6);
    }

    proptest! {
        #[test]
        fn longest_never_below_current(
            days in proptest::collection::vec(0u32..400, 1..60),
        ) {
            // Interpret each element as an offset in days from an epoch and
            // replay the activities in order.
            let mut sorted = days.clone();
            sorted.sort_unstable();

            let mut counters = fresh();
            for offset in sorted {
                let now = at(2024, 1, 1, 12) + chrono::Duration::days(i64::from(offset));
                if let Some(updated) = advance(&counters, now) {
                    counters = updated;
                }
                prop_assert!(counters.longest_streak >= counters.current_streak);
                prop_assert!(counters.current_streak >= 1);
            }
        }
    }
}
