//! Consecutive-day focus streaks.

use std::collections::BTreeSet;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::model::Session;
use crate::timer::SessionKind;

/// How far back the current streak walk goes, today included.
pub const CURRENT_STREAK_LOOKBACK_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Distinct local calendar dates with at least one completed focus session.
pub fn focus_days<Tz: TimeZone>(sessions: &[Session], tz: &Tz) -> BTreeSet<NaiveDate> {
    sessions
        .iter()
        .filter(|s| s.kind == SessionKind::Focus)
        .map(|s| s.completed_at.with_timezone(tz).date_naive())
        .collect()
}

/// Days in a row ending today (or yesterday, if today has no session yet).
///
/// A missing today does not break the streak; any other gap does.
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    for offset in 0..CURRENT_STREAK_LOOKBACK_DAYS {
        if days.contains(&day) {
            streak += 1;
        } else if offset > 0 {
            break;
        }
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Longest run of consecutive dates anywhere in history.
pub fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for &day in days {
        run = match prev {
            Some(p) if p.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }
    longest
}

pub fn calculate(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> Streaks {
    Streaks {
        current: current_streak(days, today),
        longest: longest_streak(days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    fn d(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Duration::days(offset)
    }

    fn set(offsets: &[i64]) -> BTreeSet<NaiveDate> {
        offsets.iter().map(|&o| d(o)).collect()
    }

    #[test]
    fn no_sessions_no_streak() {
        assert_eq!(calculate(&BTreeSet::new(), d(0)), Streaks { current: 0, longest: 0 });
    }

    #[test]
    fn single_session_today() {
        assert_eq!(calculate(&set(&[0]), d(0)), Streaks { current: 1, longest: 1 });
    }

    #[test]
    fn single_session_yesterday_still_counts() {
        assert_eq!(calculate(&set(&[0]), d(1)), Streaks { current: 1, longest: 1 });
    }

    #[test]
    fn single_old_session_has_no_current_streak() {
        assert_eq!(calculate(&set(&[0]), d(5)), Streaks { current: 0, longest: 1 });
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        assert_eq!(calculate(&set(&[0, 1, 2]), d(2)), Streaks { current: 3, longest: 3 });
    }

    #[test]
    fn gap_splits_runs() {
        let days = set(&[0, 1, 5, 6, 7]);
        assert_eq!(calculate(&days, d(7)), Streaks { current: 3, longest: 3 });
    }

    #[test]
    fn missing_today_keeps_streak() {
        assert_eq!(current_streak(&set(&[0, 1, 2]), d(3)), 3);
    }

    #[test]
    fn missing_yesterday_breaks_streak() {
        assert_eq!(current_streak(&set(&[0, 1, 2]), d(4)), 0);
        assert_eq!(current_streak(&set(&[0, 1, 2, 4]), d(4)), 1);
    }

    #[test]
    fn current_streak_is_capped() {
        let days: Vec<i64> = (0..40).collect();
        let days = set(&days);
        assert_eq!(current_streak(&days, d(39)), CURRENT_STREAK_LOOKBACK_DAYS);
        assert_eq!(longest_streak(&days), 40);
    }

    #[test]
    fn longest_may_be_in_the_past() {
        let days = set(&[0, 1, 2, 3, 10]);
        assert_eq!(calculate(&days, d(10)), Streaks { current: 1, longest: 4 });
    }

    #[test]
    fn focus_days_ignores_breaks_and_dedups() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mk = |kind, hours| Session {
            id: format!("{hours}"),
            kind,
            duration_minutes: 25,
            completed_at: at + Duration::hours(hours),
            task_id: None,
        };
        let sessions = vec![
            mk(SessionKind::Focus, 0),
            mk(SessionKind::Focus, 2),
            mk(SessionKind::LongBreak, 30),
        ];
        let days = focus_days(&sessions, &Utc);
        assert_eq!(days.len(), 1);
        assert!(days.contains(&d(0)));
    }

    #[test]
    fn focus_days_uses_local_calendar() {
        let offset = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        let late_utc = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
        let sessions = vec![Session {
            id: "s".into(),
            kind: SessionKind::Focus,
            duration_minutes: 25,
            completed_at: late_utc,
            task_id: None,
        }];
        assert!(focus_days(&sessions, &offset).contains(&d(1)));
    }

    proptest! {
        #[test]
        fn streaks_are_bounded(offsets in prop::collection::btree_set(0i64..120, 0..60), today in 0i64..130) {
            let days: BTreeSet<NaiveDate> = offsets.iter().map(|&o| d(o)).collect();
            let s = calculate(&days, d(today));
            prop_assert!(s.longest as usize <= days.len());
            prop_assert!(s.current <= CURRENT_STREAK_LOOKBACK_DAYS);
            prop_assert!(s.current <= s.longest);
        }
    }
}
