mod generator;
mod model;
mod validate;

pub use generator::{
    fallback_plan, resolve_plan, FitnessLevel, GenerationRequest, IntensityPreference,
    PlanSource, ResolvedPlan, StaticPlanGenerator, WorkoutGenerator,
};
pub use model::{ExerciseSpec, Phase, RepTarget, WorkoutPlan};
pub use validate::{validate_plan, PlanLimits};
