//! Range checks applied to every plan before a session may use it.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::model::{ExerciseSpec, WorkoutPlan};
use crate::error::ValidationError;

/// Accepted ranges for generated plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    #[serde(default = "default_sets")]
    pub sets: RangeInclusive<u32>,
    #[serde(default = "default_reps")]
    pub reps: RangeInclusive<u32>,
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: RangeInclusive<u32>,
    #[serde(default = "default_duration_min")]
    pub estimated_duration_min: RangeInclusive<u32>,
}

fn default_sets() -> RangeInclusive<u32> {
    1..=6
}
fn default_reps() -> RangeInclusive<u32> {
    1..=50
}
fn default_rest_seconds() -> RangeInclusive<u32> {
    15..=300
}
fn default_duration_min() -> RangeInclusive<u32> {
    5..=180
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            sets: default_sets(),
            reps: default_reps(),
            rest_seconds: default_rest_seconds(),
            estimated_duration_min: default_duration_min(),
        }
    }
}

fn check(
    exercise: &str,
    field: &'static str,
    value: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfBounds {
            exercise: exercise.to_string(),
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

fn validate_exercise(exercise: &ExerciseSpec, limits: &PlanLimits) -> Result<(), ValidationError> {
    if exercise.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".into(),
            message: "exercise name is empty".into(),
        });
    }
    check(&exercise.name, "sets", exercise.target_sets, &limits.sets)?;
    if let Some(reps) = exercise.target_reps.count() {
        check(&exercise.name, "reps", reps, &limits.reps)?;
    }
    check(
        &exercise.name,
        "rest_seconds",
        exercise.rest_seconds,
        &limits.rest_seconds,
    )
}

/// Validate a plan against `limits`.
///
/// # Errors
/// Returns the first violation found, walking phases in execution order.
pub fn validate_plan(plan: &WorkoutPlan, limits: &PlanLimits) -> Result<(), ValidationError> {
    if plan.main.is_empty() {
        return Err(ValidationError::EmptyPlan);
    }
    check(
        &plan.title,
        "estimated_duration_min",
        plan.estimated_duration_min,
        &limits.estimated_duration_min,
    )?;
    plan.exercises()
        .try_for_each(|(_, _, exercise)| validate_exercise(exercise, limits))
}
