//! XP and level changes for a finished session.

use serde::{Deserialize, Serialize};

use super::feedback::Feedback;
use crate::session::PerformanceSummary;

/// XP rules. Defaults are the production values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardConfig {
    #[serde(default = "default_base_xp")]
    pub base_xp: u32,
    /// Bonus for 100% completion.
    #[serde(default = "default_perfect_bonus")]
    pub perfect_bonus: u32,
    /// Bonus for meeting the completion threshold without reaching 100%.
    #[serde(default = "default_threshold_bonus")]
    pub threshold_bonus: u32,
    #[serde(default = "default_hard_session_bonus")]
    pub hard_session_bonus: u32,
    /// Difficulty rating at or above which the hard-session bonus applies.
    #[serde(default = "default_hard_difficulty")]
    pub hard_difficulty: u8,
    #[serde(default = "default_long_session_bonus")]
    pub long_session_bonus: u32,
    #[serde(default = "default_long_session_minutes")]
    pub long_session_minutes: u64,
    #[serde(default = "default_detailed_notes_bonus")]
    pub detailed_notes_bonus: u32,
    /// Notes must be strictly longer than this to earn the bonus. Leading and
    /// trailing whitespace is not counted.
    #[serde(default = "default_detailed_notes_min_chars")]
    pub detailed_notes_min_chars: usize,
    #[serde(default = "default_xp_per_level")]
    pub xp_per_level: u32,
}

fn default_base_xp() -> u32 {
    50
}
fn default_perfect_bonus() -> u32 {
    25
}
fn default_threshold_bonus() -> u32 {
    15
}
fn default_hard_session_bonus() -> u32 {
    10
}
fn default_hard_difficulty() -> u8 {
    4
}
fn default_long_session_bonus() -> u32 {
    10
}
fn default_long_session_minutes() -> u64 {
    45
}
fn default_detailed_notes_bonus() -> u32 {
    5
}
fn default_detailed_notes_min_chars() -> usize {
    10
}
fn default_xp_per_level() -> u32 {
    500
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            base_xp: default_base_xp(),
            perfect_bonus: default_perfect_bonus(),
            threshold_bonus: default_threshold_bonus(),
            hard_session_bonus: default_hard_session_bonus(),
            hard_difficulty: default_hard_difficulty(),
            long_session_bonus: default_long_session_bonus(),
            long_session_minutes: default_long_session_minutes(),
            detailed_notes_bonus: default_detailed_notes_bonus(),
            detailed_notes_min_chars: default_detailed_notes_min_chars(),
            xp_per_level: default_xp_per_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XpBreakdown {
    pub base: u32,
    pub completion: u32,
    pub difficulty: u32,
    pub duration: u32,
    pub feedback_detail: u32,
}

impl XpBreakdown {
    pub fn total(&self) -> u32 {
        self.base + self.completion + self.difficulty + self.duration + self.feedback_detail
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardResult {
    pub xp_gain: u32,
    pub breakdown: XpBreakdown,
    pub previous_xp: u64,
    pub new_xp: u64,
    pub previous_level: u32,
    pub new_level: u32,
    pub level_up: bool,
}

/// Level for a running XP total: one level per `xp_per_level`, starting at 1.
pub fn level_for_xp(xp: u64, xp_per_level: u32) -> u32 {
    let per_level = u64::from(xp_per_level.max(1));
    u32::try_from(xp / per_level).unwrap_or(u32::MAX - 1) + 1
}

/// Compute the XP delta for a finished session.
///
/// `threshold_pct` is the same completion threshold that gates the streak.
/// Nothing is mutated; the caller commits `new_xp`/`new_level`.
pub fn calculate_reward(
    summary: &PerformanceSummary,
    feedback: &Feedback,
    current_xp: u64,
    current_level: u32,
    threshold_pct: u8,
    config: &RewardConfig,
) -> RewardResult {
    let completion = if summary.completion_percentage >= 100 {
        config.perfect_bonus
    } else if summary.meets_threshold(threshold_pct) {
        config.threshold_bonus
    } else {
        0
    };

    let breakdown = XpBreakdown {
        base: config.base_xp,
        completion,
        difficulty: if feedback.difficulty >= config.hard_difficulty {
            config.hard_session_bonus
        } else {
            0
        },
        duration: if summary.duration_minutes() >= config.long_session_minutes {
            config.long_session_bonus
        } else {
            0
        },
        feedback_detail: if feedback.notes_len() > config.detailed_notes_min_chars {
            config.detailed_notes_bonus
        } else {
            0
        },
    };

    let xp_gain = breakdown.total();
    let new_xp = current_xp.saturating_add(u64::from(xp_gain));
    let new_level = level_for_xp(new_xp, config.xp_per_level);

    RewardResult {
        xp_gain,
        breakdown,
        previous_xp: current_xp,
        new_xp,
        previous_level: current_level,
        new_level,
        level_up: new_level > current_level,
    }
}
