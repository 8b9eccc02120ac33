//! Daily completion streak (constance) tracking

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use common::models::User;
use tracing::debug;

/// Length of the unbroken run of completed days ending at `end`
fn run_ending_at(days: &BTreeSet<NaiveDate>, end: NaiveDate) -> i32 {
    let mut count = 0;
    let mut day = end;
    while days.contains(&day) {
        count += 1;
        day -= Duration::days(1);
    }
    count
}

/// Add `date` to the user's completed days and recompute the streak from it
pub fn mark_day_completed(user: &mut User, date: NaiveDate) {
    user.completed_days.insert(date);
    user.constance = run_ending_at(&user.completed_days, date);
    if user.constance > user.max_constance {
        user.max_constance = user.constance;
    }
    debug!(
        "Day {} completed for {}: constance {} (max {})",
        date, user.id, user.constance, user.max_constance
    );
}

/// Remove `date` and recompute the streak from the latest remaining completed day
pub fn unmark_day_complete(user: &mut User, date: NaiveDate) {
    user.completed_days.remove(&date);
    user.constance = match user.completed_days.iter().next_back() {
        Some(&latest) => run_ending_at(&user.completed_days, latest),
        None => 0,
    };
    debug!(
        "Day {} uncompleted for {}: constance {}",
        date, user.id, user.constance
    );
}

/// Current streak as seen on `reference`
///
/// A run ending on `reference` counts; so does one ending the day before,
/// since the reference day may simply not be done yet.
pub fn current_constance(days: &BTreeSet<NaiveDate>, reference: NaiveDate) -> i32 {
    if days.contains(&reference) {
        run_ending_at(days, reference)
    } else {
        run_ending_at(days, reference - Duration::days(1))
    }
}

/// Longest unbroken run anywhere in the set
pub fn longest_run(days: &BTreeSet<NaiveDate>) -> i32 {
    let mut best = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        current = match previous {
            Some(p) if day - p == Duration::days(1) => current + 1,
            _ => 1,
        };
        best = best.max(current);
        previous = Some(day);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::{ConstanceConfiguration, XpProgress};
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn make_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "ana".to_string(),
            xp: XpProgress::starting(100.0),
            constance: 0,
            max_constance: 0,
            constance_configuration: ConstanceConfiguration::AnyItem,
            completed_days: BTreeSet::new(),
        }
    }

    #[test]
    fn test_consecutive_days_build_streak() {
        let mut user = make_user();
        for d in 1..=4 {
            mark_day_completed(&mut user, day(d));
        }

        assert_eq!(user.constance, 4);
        assert_eq!(user.max_constance, 4);
    }

    #[test]
    fn test_gap_restarts_streak_but_keeps_max() {
        let mut user = make_user();
        for d in [1, 2, 3, 5] {
            mark_day_completed(&mut user, day(d));
        }

        assert_eq!(user.constance, 1);
        assert_eq!(user.max_constance, 3);
    }

    #[test]
    fn test_filling_gap_joins_runs() {
        let mut user = make_user();
        for d in [1, 2, 4, 5, 3] {
            mark_day_completed(&mut user, day(d));
        }

        // Streak walks backward from the marked date only
        assert_eq!(user.constance, 3);
        assert_eq!(user.max_constance, 3);
        assert_eq!(current_constance(&user.completed_days, day(5)), 5);
    }

    #[test]
    fn test_unmark_recomputes_from_latest_remaining_day() {
        let mut user = make_user();
        for d in [1, 2, 3, 4] {
            mark_day_completed(&mut user, day(d));
        }
        unmark_day_complete(&mut user, day(2));

        assert_eq!(user.constance, 2);
        assert_eq!(user.max_constance, 4);
    }

    #[test]
    fn test_unmark_last_day() {
        let mut user = make_user();
        mark_day_completed(&mut user, day(1));
        unmark_day_complete(&mut user, day(1));

        assert_eq!(user.constance, 0);
        assert_eq!(user.max_constance, 1);
        assert!(user.completed_days.is_empty());
    }

    #[test]
    fn test_max_constance_never_decreases() {
        let mut user = make_user();
        let mut last_max = 0;
        let ops: [(bool, u32); 8] = [
            (true, 1),
            (true, 2),
            (false, 2),
            (true, 3),
            (true, 2),
            (false, 1),
            (false, 3),
            (true, 10),
        ];
        for (mark, d) in ops {
            if mark {
                mark_day_completed(&mut user, day(d));
            } else {
                unmark_day_complete(&mut user, day(d));
            }
            assert!(user.max_constance >= last_max);
            last_max = user.max_constance;
        }
        assert_eq!(user.max_constance, 2);
    }

    #[test]
    fn test_current_constance_counts_yesterday_run() {
        let days: BTreeSet<_> = [day(1), day(2), day(3)].into_iter().collect();

        assert_eq!(current_constance(&days, day(3)), 3);
        assert_eq!(current_constance(&days, day(4)), 3);
        assert_eq!(current_constance(&days, day(5)), 0);
    }

    #[test]
    fn test_current_constance_empty() {
        assert_eq!(current_constance(&BTreeSet::new(), day(5)), 0);
    }

    #[test]
    fn test_longest_run() {
        let days: BTreeSet<_> = [day(1), day(2), day(5), day(6), day(7), day(9)]
            .into_iter()
            .collect();

        assert_eq!(longest_run(&days), 3);
        assert_eq!(longest_run(&BTreeSet::new()), 0);
    }
}
