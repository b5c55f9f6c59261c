//! Daily streak continuity.
//!
//! A streak counts consecutive calendar days with at least one session
//! that met the completion threshold. Sessions below the threshold are
//! covered by a grace policy: they neither grow nor break the streak.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Streak policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Minimum completion percentage for a session to count.
    #[serde(default = "default_threshold")]
    pub completion_threshold_pct: u8,
    /// Streak lengths that produce a milestone notification.
    #[serde(default = "default_milestones")]
    pub milestones: Vec<u32>,
}

fn default_threshold() -> u8 {
    80
}

fn default_milestones() -> Vec<u32> {
    vec![3, 7, 14, 30, 60, 100, 365]
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            completion_threshold_pct: default_threshold(),
            milestones: default_milestones(),
        }
    }
}

/// Inputs to [`accumulate_streak`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInput {
    pub last_workout_date: Option<NaiveDate>,
    pub today: NaiveDate,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub meets_threshold: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub streak_broken: bool,
    /// Whole days skipped between the previous workout and today.
    pub missed_days: u32,
    pub last_workout_date: Option<NaiveDate>,
}

impl StreakResult {
    /// Carries the input through. `longest_streak` is raised to
    /// `current_streak` if the stored profile had it lower, so the result
    /// always satisfies `longest >= current`.
    fn unchanged(input: &StreakInput) -> Self {
        Self {
            current_streak: input.current_streak,
            longest_streak: input.longest_streak.max(input.current_streak),
            streak_broken: false,
            missed_days: 0,
            last_workout_date: input.last_workout_date,
        }
    }

    /// Whether the streak grew compared to `previous`.
    pub fn grew_from(&self, previous: u32) -> bool {
        self.current_streak > previous
    }
}

/// Fold one finished session into the streak record.
///
/// Pure and total: every input produces a result, and
/// `longest_streak >= current_streak` always holds on the output.
pub fn accumulate_streak(input: StreakInput) -> StreakResult {
    if !input.meets_threshold {
        return StreakResult::unchanged(&input);
    }

    let Some(last) = input.last_workout_date else {
        // First qualifying workout on record.
        let current = input.current_streak.max(1);
        return StreakResult {
            current_streak: current,
            longest_streak: input.longest_streak.max(current),
            streak_broken: false,
            missed_days: 0,
            last_workout_date: Some(input.today),
        };
    };

    let days_between = (input.today - last).num_days();

    // Same day, or a clock that went backwards: nothing to add.
    if days_between <= 0 {
        return StreakResult::unchanged(&input);
    }

    let (current, broken, missed) = if days_between == 1 {
        (input.current_streak.saturating_add(1), false, 0)
    } else {
        let missed = u32::try_from(days_between - 1).unwrap_or(u32::MAX);
        (1, true, missed)
    };

    StreakResult {
        current_streak: current,
        longest_streak: input.longest_streak.max(current),
        streak_broken: broken,
        missed_days: missed,
        last_workout_date: Some(input.today),
    }
}

/// The milestone reached by moving from `previous` to `current`, if any.
pub fn milestone_reached(previous: u32, current: u32, milestones: &[u32]) -> Option<u32> {
    milestones
        .iter()
        .copied()
        .filter(|&m| previous < m && current >= m)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn input(last: Option<&str>, today: &str, current: u32, longest: u32, meets: bool) -> StreakInput {
        StreakInput {
            last_workout_date: last.map(date),
            today: date(today),
            current_streak: current,
            longest_streak: longest,
            meets_threshold: meets,
        }
    }

    #[test]
    fn gap_resets_streak() {
        let r = accumulate_streak(input(Some("2024-01-01"), "2024-01-05", 10, 10, true));
        assert_eq!(r.current_streak, 1);
        assert!(r.streak_broken);
        assert_eq!(r.missed_days, 3);
        assert_eq!(r.longest_streak, 10);
        assert_eq!(r.last_workout_date, Some(date("2024-01-05")));
    }

    #[test]
    fn consecutive_day_grows_streak() {
        let r = accumulate_streak(input(Some("2024-01-01"), "2024-01-02", 4, 4, true));
        assert_eq!(r.current_streak, 5);
        assert!(!r.streak_broken);
        assert_eq!(r.longest_streak, 5);
    }

    #[test]
    fn same_day_is_unchanged() {
        let r = accumulate_streak(input(Some("2024-01-02"), "2024-01-02", 5, 9, true));
        assert_eq!(r.current_streak, 5);
        assert_eq!(r.longest_streak, 9);
        assert!(!r.streak_broken);
    }

    #[test]
    fn first_workout_starts_streak_at_one() {
        let r = accumulate_streak(input(None, "2024-03-01", 0, 0, true));
        assert_eq!(r.current_streak, 1);
        assert_eq!(r.longest_streak, 1);
        assert_eq!(r.last_workout_date, Some(date("2024-03-01")));
    }

    #[test]
    fn below_threshold_keeps_everything() {
        let i = input(Some("2024-01-01"), "2024-01-09", 6, 8, false);
        let r = accumulate_streak(i);
        assert_eq!(r.current_streak, 6);
        assert_eq!(r.longest_streak, 8);
        assert_eq!(r.last_workout_date, i.last_workout_date);
        assert!(!r.streak_broken);
        assert_eq!(r.missed_days, 0);
    }

    #[test]
    fn inconsistent_longest_is_repaired_on_grace() {
        let r = accumulate_streak(input(Some("2024-01-01"), "2024-01-02", 5, 2, false));
        assert_eq!(r.current_streak, 5);
        assert_eq!(r.longest_streak, 5);
        assert_eq!(r.last_workout_date, Some(date("2024-01-01")));
    }

    #[test]
    fn backwards_clock_is_treated_as_same_day() {
        let r = accumulate_streak(input(Some("2024-01-05"), "2024-01-03", 3, 3, true));
        assert_eq!(r.current_streak, 3);
        assert_eq!(r.last_workout_date, Some(date("2024-01-05")));
    }

    #[test]
    fn milestone_detection() {
        let milestones = [3, 7, 30];
        assert_eq!(milestone_reached(2, 3, &milestones), Some(3));
        assert_eq!(milestone_reached(3, 3, &milestones), None);
        assert_eq!(milestone_reached(6, 8, &milestones), Some(7));
        assert_eq!(milestone_reached(10, 1, &milestones), None);
    }

    fn arb_input() -> impl Strategy<Value = StreakInput> {
        (
            proptest::option::of(0i64..20_000),
            0i64..20_000,
            0u32..5_000,
            0u32..5_000,
            any::<bool>(),
        )
            .prop_map(|(last, today, current, longest, meets)| {
                let epoch = date("1990-01-01");
                StreakInput {
                    last_workout_date: last.map(|d| epoch + Duration::days(d)),
                    today: epoch + Duration::days(today),
                    current_streak: current,
                    longest_streak: longest,
                    meets_threshold: meets,
                }
            })
    }

    proptest! {
        #[test]
        fn longest_never_below_current(i in arb_input()) {
            let r = accumulate_streak(i);
            prop_assert!(r.longest_streak >= r.current_streak);
        }

        #[test]
        fn longest_never_decreases(i in arb_input()) {
            let r = accumulate_streak(i);
            prop_assert!(r.longest_streak >= i.longest_streak);
        }

        #[test]
        fn deterministic(i in arb_input()) {
            prop_assert_eq!(accumulate_streak(i), accumulate_streak(i));
        }

        #[test]
        fn same_day_rerun_is_idempotent(day in 0i64..20_000, current in 0u32..1_000, extra in 0u32..1_000) {
            let d = date("1990-01-01") + Duration::days(day);
            let i = StreakInput {
                last_workout_date: Some(d),
                today: d,
                current_streak: current,
                longest_streak: current + extra,
                meets_threshold: true,
            };
            let first = accumulate_streak(i);
            let second = accumulate_streak(StreakInput {
                current_streak: first.current_streak,
                longest_streak: first.longest_streak,
                last_workout_date: first.last_workout_date,
                ..i
            });
            prop_assert_eq!(first, second);
            prop_assert_eq!(first.current_streak, current);
        }

        #[test]
        fn grace_period_preserves_streak_fields(i in arb_input(), extra in 0u32..1_000) {
            let i = StreakInput {
                meets_threshold: false,
                longest_streak: i.current_streak + extra,
                ..i
            };
            let r = accumulate_streak(i);
            prop_assert_eq!(r.current_streak, i.current_streak);
            prop_assert_eq!(r.longest_streak, i.longest_streak);
            prop_assert_eq!(r.last_workout_date, i.last_workout_date);
            prop_assert!(!r.streak_broken);
        }

        #[test]
        fn gaps_reset_with_missed_days(start in 0i64..10_000, gap in 2i64..5_000, current in 0u32..1_000) {
            let last = date("1990-01-01") + Duration::days(start);
            let r = accumulate_streak(StreakInput {
                last_workout_date: Some(last),
                today: last + Duration::days(gap),
                current_streak: current,
                longest_streak: current,
                meets_threshold: true,
            });
            prop_assert_eq!(r.current_streak, 1);
            prop_assert!(r.streak_broken);
            prop_assert_eq!(i64::from(r.missed_days), gap - 1);
        }
    }
}
