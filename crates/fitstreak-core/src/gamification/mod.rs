//! Progress gamification: streaks, XP, badges and feedback signals.

mod badges;
mod feedback;
mod pipeline;
mod profile;
mod reward;
mod streak;

pub use badges::{
    evaluate_badges, Badge, BadgeBook, BadgeCatalog, Rarity, Requirement, RequirementKind,
    UnlockedBadge,
};
pub use feedback::{
    derive_signals, DifficultyAdjustment, Feedback, FeedbackSignals, IntensitySignal,
    QuickReaction, VarietyPreference,
};
pub use pipeline::{
    run_completion_pipeline, CompletionKey, CompletionLedger, CompletionPayload,
    LEDGER_RETENTION_DAYS,
};
pub use profile::{GamificationProfile, UserProgress};
pub use reward::{calculate_reward, level_for_xp, RewardConfig, RewardResult, XpBreakdown};
pub use streak::{accumulate_streak, milestone_reached, StreakConfig, StreakInput, StreakResult};
