use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use fitstreak_core::gamification::derive_signals;
use fitstreak_core::plan::{
    resolve_plan, FitnessLevel, GenerationRequest, IntensityPreference, PlanSource, ResolvedPlan,
    StaticPlanGenerator, WorkoutGenerator, WorkoutPlan,
};
use fitstreak_core::{EngineConfig, EngineError};

use super::{load_progress, plan_key, print_json};
use crate::store::Store;

#[derive(Clone, Copy, ValueEnum)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl From<Level> for FitnessLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Beginner => FitnessLevel::Beginner,
            Level::Intermediate => FitnessLevel::Intermediate,
            Level::Advanced => FitnessLevel::Advanced,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Intensity {
    Low,
    Moderate,
    High,
}

impl From<Intensity> for IntensityPreference {
    fn from(intensity: Intensity) -> Self {
        match intensity {
            Intensity::Low => IntensityPreference::Low,
            Intensity::Moderate => IntensityPreference::Moderate,
            Intensity::High => IntensityPreference::High,
        }
    }
}

#[derive(Subcommand)]
pub enum PlanAction {
    /// Resolve a workout plan and store it as the pending plan
    Resolve {
        /// JSON plan to use as the generator's answer
        #[arg(long)]
        plan_file: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Level::Beginner)]
        level: Level,
        /// Requested duration in minutes
        #[arg(long, default_value_t = 30)]
        minutes: u32,
        /// Training goal (repeatable)
        #[arg(long = "goal")]
        goals: Vec<String>,
        /// Available equipment (repeatable)
        #[arg(long)]
        equipment: Vec<String>,
        #[arg(long, value_enum, default_value_t = Intensity::Moderate)]
        intensity: Intensity,
    },
    /// Print the pending plan as JSON
    Show,
}

/// Stand-in when no generator is available; always triggers the fallback.
struct OfflineGenerator;

impl WorkoutGenerator for OfflineGenerator {
    fn name(&self) -> &str {
        "offline"
    }

    fn generate(&self, _request: &GenerationRequest) -> fitstreak_core::Result<WorkoutPlan> {
        Err(EngineError::ExternalService {
            service: self.name().to_string(),
            message: "no workout generator configured".into(),
        })
    }
}

pub fn run(action: PlanAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;

    match action {
        PlanAction::Resolve {
            plan_file,
            level,
            minutes,
            goals,
            equipment,
            intensity,
        } => {
            let previous: Option<ResolvedPlan> = store.load(&plan_key(user))?;
            let progress = load_progress(&store, user)?;
            let request = GenerationRequest {
                fitness_level: level.into(),
                goals,
                equipment,
                duration_minutes: minutes,
                intensity_preference: intensity.into(),
                recent_exercise_names: previous
                    .map(|p| p.plan.exercise_names())
                    .unwrap_or_default(),
                prior_feedback_signals: progress.feedback_log.values().next_back().map(derive_signals),
            };

            let config = EngineConfig::load_or_default();
            let resolved = match plan_file {
                Some(path) => resolve_plan(&StaticPlanGenerator::new(path), &request, &config.plan_limits),
                None => resolve_plan(&OfflineGenerator, &request, &config.plan_limits),
            };
            if let PlanSource::Fallback { reason } = &resolved.source {
                eprintln!("{reason}");
            }

            store.save(&plan_key(user), &resolved)?;
            print_json(&resolved)?;
        }
        PlanAction::Show => {
            let resolved: ResolvedPlan = store
                .load(&plan_key(user))?
                .ok_or("no pending plan; run `fitstreak plan resolve` first")?;
            print_json(&resolved)?;
        }
    }
    Ok(())
}
