use serde::{Deserialize, Serialize};

use super::log::PerformanceLog;
use crate::plan::WorkoutPlan;

/// Snapshot of how much of the plan was completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub completed_exercises: usize,
    pub total_exercises: usize,
    pub completed_sets: u32,
    pub total_sets: u32,
    /// `round(100 * completed_sets / total_sets)`, clamped to 0..=100.
    pub completion_percentage: u8,
    pub duration_seconds: u64,
}

impl PerformanceSummary {
    /// Summarize `log` against `plan`.
    ///
    /// Records that fall outside the plan are ignored, so overwrites and
    /// back-navigation never inflate the count.
    pub fn from_log(plan: &WorkoutPlan, log: &PerformanceLog, duration_seconds: u64) -> Self {
        let mut completed_sets = 0u32;
        let mut completed_exercises = 0usize;

        for (phase, exercise_index, exercise) in plan.exercises() {
            let target = usize::try_from(exercise.target_sets).unwrap_or(usize::MAX);
            let done = log
                .for_exercise(phase, exercise_index)
                .filter(|(key, actual)| key.set_index < target && actual.completed)
                .count();
            let done = u32::try_from(done).unwrap_or(u32::MAX);
            completed_sets = completed_sets.saturating_add(done);
            if done == exercise.target_sets && done > 0 {
                completed_exercises += 1;
            }
        }

        let total_sets = plan.total_sets();
        Self {
            completed_exercises,
            total_exercises: plan.total_exercises(),
            completed_sets,
            total_sets,
            completion_percentage: completion_percentage(completed_sets, total_sets),
            duration_seconds,
        }
    }

    /// Whether the session counts toward the streak.
    pub fn meets_threshold(&self, threshold_pct: u8) -> bool {
        self.completion_percentage >= threshold_pct
    }

    pub fn duration_minutes(&self) -> u64 {
        self.duration_seconds / 60
    }
}

/// Rounded completion percentage; 0 for an empty plan.
pub fn completion_percentage(completed_sets: u32, total_sets: u32) -> u8 {
    if total_sets == 0 {
        return 0;
    }
    let pct = (100.0 * f64::from(completed_sets) / f64::from(total_sets)).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{ExerciseSpec, Phase, RepTarget};
    use crate::session::log::{ActualPerformance, SetKey};
    use proptest::prelude::*;

    #[test]
    fn eight_of_ten_is_exactly_eighty() {
        assert_eq!(completion_percentage(8, 10), 80);
    }

    #[test]
    fn rounds_to_nearest() {
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(0, 0), 0);
    }

    proptest! {
        #[test]
        fn percentage_is_always_clamped(completed in 0u32..10_000, total in 0u32..10_000) {
            prop_assert!(completion_percentage(completed, total) <= 100);
        }
    }

    #[test]
    fn summary_counts_only_completed_planned_sets() {
        let plan = WorkoutPlan {
            title: "t".into(),
            estimated_duration_min: 20,
            warmup: vec![],
            main: vec![
                ExerciseSpec::new("Squat", 2, RepTarget::Count(10), 30),
                ExerciseSpec::new("Row", 2, RepTarget::Count(10), 30),
            ],
            cooldown: vec![],
        };
        let mut log = PerformanceLog::new();
        let key = |exercise_index, set_index| SetKey {
            phase: Phase::Main,
            exercise_index,
            set_index,
        };
        log.record(key(0, 0), ActualPerformance::reps(10));
        log.record(key(0, 1), ActualPerformance::reps(9));
        log.record(
            key(1, 0),
            ActualPerformance {
                reps: Some(3),
                completed: false,
                ..Default::default()
            },
        );
        log.record(key(1, 5), ActualPerformance::reps(10));

        let summary = PerformanceSummary::from_log(&plan, &log, 600);
        assert_eq!(summary.completed_sets, 2);
        assert_eq!(summary.total_sets, 4);
        assert_eq!(summary.completed_exercises, 1);
        assert_eq!(summary.completion_percentage, 50);
        assert!(!summary.meets_threshold(80));
    }

    #[test]
    fn huge_set_targets_saturate_instead_of_overflowing() {
        let plan = WorkoutPlan {
            title: "t".into(),
            estimated_duration_min: 20,
            warmup: vec![ExerciseSpec::new("March", u32::MAX, RepTarget::Count(10), 30)],
            main: vec![ExerciseSpec::new("Squat", 2, RepTarget::Count(10), 30)],
            cooldown: vec![],
        };
        let mut log = PerformanceLog::new();
        log.record(
            SetKey {
                phase: Phase::Warmup,
                exercise_index: 0,
                set_index: 0,
            },
            ActualPerformance::reps(10),
        );

        let summary = PerformanceSummary::from_log(&plan, &log, 60);
        assert_eq!(summary.total_sets, u32::MAX);
        assert_eq!(summary.completed_sets, 1);
        assert_eq!(summary.completed_exercises, 0);
        assert_eq!(summary.completion_percentage, 0);
    }
}
