use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::badges::BadgeBook;
use super::feedback::Feedback;
use super::pipeline::CompletionLedger;

/// Aggregate per-user progress. Changed only by the completion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationProfile {
    pub streak: u32,
    pub longest_streak: u32,
    pub last_workout_date: Option<NaiveDate>,
    pub total_workouts: u32,
    pub level: u32,
    pub xp: u64,
}

impl Default for GamificationProfile {
    fn default() -> Self {
        Self {
            streak: 0,
            longest_streak: 0,
            last_workout_date: None,
            total_workouts: 0,
            level: 1,
            xp: 0,
        }
    }
}

/// Everything the engine keeps about one user between sessions.
///
/// The caller owns persistence: load it before `finish()`, store it after.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProgress {
    #[serde(default)]
    pub profile: GamificationProfile,
    #[serde(default)]
    pub badges: BadgeBook,
    #[serde(default)]
    pub ledger: CompletionLedger,
    /// First feedback submitted on each calendar day.
    #[serde(default)]
    pub feedback_log: BTreeMap<NaiveDate, Feedback>,
}

impl UserProgress {
    pub fn feedback_for(&self, date: NaiveDate) -> Option<&Feedback> {
        self.feedback_log.get(&date)
    }
}
