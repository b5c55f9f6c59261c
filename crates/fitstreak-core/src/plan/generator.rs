//! Plan resolution against the external workout generator.
//!
//! The generator is an outside service; the engine only validates what it
//! returns and falls back to a deterministic bodyweight plan when the
//! service fails or produces something out of range.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::model::{ExerciseSpec, RepTarget, WorkoutPlan};
use super::validate::{validate_plan, PlanLimits};
use crate::error::{EngineError, Result};
use crate::gamification::FeedbackSignals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    fn fallback_sets(self) -> u32 {
        match self {
            FitnessLevel::Beginner => 2,
            FitnessLevel::Intermediate => 3,
            FitnessLevel::Advanced => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityPreference {
    Low,
    #[default]
    Moderate,
    High,
}

/// Everything the generator is given to produce a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub fitness_level: FitnessLevel,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub intensity_preference: IntensityPreference,
    #[serde(default)]
    pub recent_exercise_names: Vec<String>,
    #[serde(default)]
    pub prior_feedback_signals: Option<FeedbackSignals>,
}

/// The external workout-generation service.
pub trait WorkoutGenerator {
    /// Identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// Produce a plan for `request`.
    ///
    /// # Errors
    /// Implementations return `EngineError::ExternalService` when the
    /// service is unreachable or its response cannot be read.
    fn generate(&self, request: &GenerationRequest) -> Result<WorkoutPlan>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanSource {
    Generated,
    /// The fallback plan was substituted; `reason` is safe to show the user.
    Fallback { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedPlan {
    pub plan: WorkoutPlan,
    pub source: PlanSource,
}

impl ResolvedPlan {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, PlanSource::Fallback { .. })
    }
}

/// Ask `generator` for a plan, substituting [`fallback_plan`] on failure.
///
/// Never fails: generator errors and invalid plans both degrade to the
/// fallback with a user-facing reason.
pub fn resolve_plan(
    generator: &dyn WorkoutGenerator,
    request: &GenerationRequest,
    limits: &PlanLimits,
) -> ResolvedPlan {
    let outcome = generator.generate(request).and_then(|plan| {
        validate_plan(&plan, limits)
            .map(|()| plan)
            .map_err(|e| EngineError::ExternalService {
                service: generator.name().to_string(),
                message: format!("generated plan rejected: {e}"),
            })
    });

    match outcome {
        Ok(plan) => ResolvedPlan {
            plan,
            source: PlanSource::Generated,
        },
        Err(e) => {
            warn!(generator = generator.name(), error = %e, "using fallback workout plan");
            ResolvedPlan {
                plan: fallback_plan(request, limits),
                source: PlanSource::Fallback {
                    reason: "We couldn't build a personalised workout right now, so here is a balanced bodyweight session.".into(),
                },
            }
        }
    }
}

/// Deterministic bodyweight plan used whenever generation fails.
///
/// The result depends only on `request.fitness_level`,
/// `request.duration_minutes` and `limits`.
pub fn fallback_plan(request: &GenerationRequest, limits: &PlanLimits) -> WorkoutPlan {
    let sets = request
        .fitness_level
        .fallback_sets()
        .clamp(*limits.sets.start(), *limits.sets.end());
    let rest = 60u32.clamp(*limits.rest_seconds.start(), *limits.rest_seconds.end());
    let short_rest = 15u32.clamp(*limits.rest_seconds.start(), *limits.rest_seconds.end());
    let duration = request.duration_minutes.clamp(
        *limits.estimated_duration_min.start(),
        *limits.estimated_duration_min.end(),
    );

    WorkoutPlan {
        title: "Balanced Bodyweight".into(),
        estimated_duration_min: duration,
        warmup: vec![
            ExerciseSpec::new("Jumping Jacks", 1, RepTarget::Text("60 seconds".into()), short_rest)
                .with_muscles(&["full body"]),
            ExerciseSpec::new("Arm Circles", 1, RepTarget::Count(20), short_rest)
                .with_muscles(&["shoulders"]),
        ],
        main: vec![
            ExerciseSpec::new("Bodyweight Squat", sets, RepTarget::Count(12), rest)
                .with_muscles(&["quads", "glutes"])
                .with_instructions("Feet shoulder-width apart, sit back until thighs are parallel."),
            ExerciseSpec::new("Push-up", sets, RepTarget::Count(10), rest)
                .with_muscles(&["chest", "triceps"])
                .with_instructions("Keep a straight line from head to heels."),
            ExerciseSpec::new("Reverse Lunge", sets, RepTarget::Count(10), rest)
                .with_muscles(&["quads", "glutes"]),
            ExerciseSpec::new("Plank", sets, RepTarget::Text("30 seconds".into()), rest)
                .with_muscles(&["core"]),
        ],
        cooldown: vec![
            ExerciseSpec::new("Hamstring Stretch", 1, RepTarget::Text("30 seconds".into()), short_rest)
                .with_muscles(&["hamstrings"]),
            ExerciseSpec::new("Child's Pose", 1, RepTarget::Text("45 seconds".into()), short_rest)
                .with_muscles(&["back"]),
        ],
    }
}

/// Generator that serves a plan stored as JSON on disk.
#[derive(Debug, Clone)]
pub struct StaticPlanGenerator {
    path: PathBuf,
}

impl StaticPlanGenerator {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl WorkoutGenerator for StaticPlanGenerator {
    fn name(&self) -> &str {
        "static-plan"
    }

    fn generate(&self, _request: &GenerationRequest) -> Result<WorkoutPlan> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| EngineError::ExternalService {
            service: self.name().to_string(),
            message: format!("cannot read {}: {e}", self.path.display()),
        })?;
        serde_json::from_str(&content).map_err(|e| EngineError::ExternalService {
            service: self.name().to_string(),
            message: format!("malformed plan: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl WorkoutGenerator for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }
        fn generate(&self, _request: &GenerationRequest) -> Result<WorkoutPlan> {
            Err(EngineError::ExternalService {
                service: "unreachable".into(),
                message: "connection refused".into(),
            })
        }
    }

    struct Fixed(WorkoutPlan);

    impl WorkoutGenerator for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn generate(&self, _request: &GenerationRequest) -> Result<WorkoutPlan> {
            Ok(self.0.clone())
        }
    }

    fn request(level: FitnessLevel, minutes: u32) -> GenerationRequest {
        GenerationRequest {
            fitness_level: level,
            duration_minutes: minutes,
            ..Default::default()
        }
    }

    #[test]
    fn fallback_plan_is_valid_and_deterministic() {
        let limits = PlanLimits::default();
        let req = request(FitnessLevel::Intermediate, 30);
        let a = fallback_plan(&req, &limits);
        let b = fallback_plan(&req, &limits);
        assert_eq!(a, b);
        assert!(validate_plan(&a, &limits).is_ok());
        assert!(a.main.iter().all(|e| e.target_sets == 3));
    }

    #[test]
    fn fallback_duration_is_clamped() {
        let limits = PlanLimits::default();
        assert_eq!(fallback_plan(&request(FitnessLevel::Beginner, 0), &limits).estimated_duration_min, 5);
        assert_eq!(fallback_plan(&request(FitnessLevel::Beginner, 500), &limits).estimated_duration_min, 180);
    }

    #[test]
    fn unreachable_generator_falls_back() {
        let resolved = resolve_plan(&Unreachable, &request(FitnessLevel::Advanced, 45), &PlanLimits::default());
        assert!(resolved.is_fallback());
        assert!(resolved.plan.main.iter().all(|e| e.target_sets == 4));
    }

    #[test]
    fn invalid_generated_plan_falls_back() {
        let mut bad = fallback_plan(&request(FitnessLevel::Beginner, 30), &PlanLimits::default());
        bad.main[0].target_sets = 12;
        bad.title = "Too Much".into();
        let resolved = resolve_plan(&Fixed(bad), &request(FitnessLevel::Beginner, 30), &PlanLimits::default());
        assert!(resolved.is_fallback());
        assert_eq!(resolved.plan.title, "Balanced Bodyweight");
    }

    #[test]
    fn valid_generated_plan_is_used() {
        let mut good = fallback_plan(&request(FitnessLevel::Beginner, 30), &PlanLimits::default());
        good.title = "Generated".into();
        let resolved = resolve_plan(&Fixed(good), &request(FitnessLevel::Beginner, 30), &PlanLimits::default());
        assert_eq!(resolved.source, PlanSource::Generated);
        assert_eq!(resolved.plan.title, "Generated");
    }

    #[test]
    fn static_generator_reports_missing_file_as_external_error() {
        let dir = tempfile::tempdir().unwrap();
        let generator = StaticPlanGenerator::new(dir.path().join("missing.json"));
        let err = generator.generate(&GenerationRequest::default()).unwrap_err();
        assert!(matches!(err, EngineError::ExternalService { .. }));
    }

    #[test]
    fn static_generator_reads_plan_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        let plan = fallback_plan(&request(FitnessLevel::Beginner, 20), &PlanLimits::default());
        std::fs::write(&path, serde_json::to_string(&plan).unwrap()).unwrap();
        let loaded = StaticPlanGenerator::new(&path).generate(&GenerationRequest::default()).unwrap();
        assert_eq!(loaded, plan);
    }
}
