use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Warmup,
    Main,
    Cooldown,
}

impl Phase {
    /// Phases in execution order.
    pub const ORDER: [Phase; 3] = [Phase::Warmup, Phase::Main, Phase::Cooldown];

    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Warmup => Some(Phase::Main),
            Phase::Main => Some(Phase::Cooldown),
            Phase::Cooldown => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Warmup => "Warm-up",
            Phase::Main => "Main",
            Phase::Cooldown => "Cool-down",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Planned reps: a count, or free text such as "30 seconds" or "to failure".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepTarget {
    Count(u32),
    Text(String),
}

impl RepTarget {
    pub fn count(&self) -> Option<u32> {
        match self {
            RepTarget::Count(n) => Some(*n),
            RepTarget::Text(_) => None,
        }
    }
}

impl fmt::Display for RepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepTarget::Count(n) => write!(f, "{n}"),
            RepTarget::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSpec {
    pub name: String,
    pub target_sets: u32,
    pub target_reps: RepTarget,
    pub rest_seconds: u32,
    #[serde(default)]
    pub target_muscles: Vec<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub modifications: Option<String>,
}

impl ExerciseSpec {
    pub fn new(name: impl Into<String>, target_sets: u32, target_reps: RepTarget, rest_seconds: u32) -> Self {
        Self {
            name: name.into(),
            target_sets,
            target_reps,
            rest_seconds,
            target_muscles: Vec::new(),
            instructions: None,
            modifications: None,
        }
    }

    pub fn with_muscles(mut self, muscles: &[&str]) -> Self {
        self.target_muscles = muscles.iter().map(|m| (*m).to_string()).collect();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// A generated workout. Immutable once a session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    #[serde(default)]
    pub title: String,
    pub estimated_duration_min: u32,
    #[serde(default)]
    pub warmup: Vec<ExerciseSpec>,
    pub main: Vec<ExerciseSpec>,
    #[serde(default)]
    pub cooldown: Vec<ExerciseSpec>,
}

impl WorkoutPlan {
    pub fn phase(&self, phase: Phase) -> &[ExerciseSpec] {
        match phase {
            Phase::Warmup => &self.warmup,
            Phase::Main => &self.main,
            Phase::Cooldown => &self.cooldown,
        }
    }

    pub fn exercise(&self, phase: Phase, index: usize) -> Option<&ExerciseSpec> {
        self.phase(phase).get(index)
    }

    /// First phase at or after `from` that has at least one exercise.
    pub fn first_non_empty_phase(&self, from: Phase) -> Option<Phase> {
        let mut phase = Some(from);
        while let Some(p) = phase {
            if !self.phase(p).is_empty() {
                return Some(p);
            }
            phase = p.next();
        }
        None
    }

    pub fn exercises(&self) -> impl Iterator<Item = (Phase, usize, &ExerciseSpec)> {
        Phase::ORDER.into_iter().flat_map(move |phase| {
            self.phase(phase)
                .iter()
                .enumerate()
                .map(move |(i, e)| (phase, i, e))
        })
    }

    pub fn total_exercises(&self) -> usize {
        self.warmup.len() + self.main.len() + self.cooldown.len()
    }

    /// Saturates at `u32::MAX` for plans that skipped validation.
    pub fn total_sets(&self) -> u32 {
        self.exercises()
            .fold(0u32, |total, (_, _, e)| total.saturating_add(e.target_sets))
    }

    /// Names of every exercise, in execution order. Fed back to the
    /// generator as `recent_exercise_names` to avoid repeats.
    pub fn exercise_names(&self) -> Vec<String> {
        self.exercises().map(|(_, _, e)| e.name.clone()).collect()
    }
}
