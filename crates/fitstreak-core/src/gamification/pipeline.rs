//! The completion pipeline: streak, then reward, then badges, then
//! feedback signals.
//!
//! Every stage runs against copies; `UserProgress` is only written once all
//! stages have succeeded, so a failure leaves no partial state behind.
//! Each run is keyed by `(session_id, date)` and recorded in the ledger so a
//! retried `finish()` can be recognised. Entries older than
//! [`LEDGER_RETENTION_DAYS`] before the newest completion are dropped.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::badges::{evaluate_badges, BadgeCatalog, UnlockedBadge};
use super::feedback::{derive_signals, Feedback, FeedbackSignals};
use super::profile::{GamificationProfile, UserProgress};
use super::reward::{calculate_reward, RewardResult};
use super::streak::{accumulate_streak, milestone_reached, StreakInput, StreakResult};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{Event, Notifier};
use crate::session::PerformanceSummary;

/// How many days before the newest completion the ledger still remembers.
pub const LEDGER_RETENTION_DAYS: u64 = 2;

/// Idempotency key for one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompletionKey {
    pub session_id: Uuid,
    pub date: NaiveDate,
}

impl fmt::Display for CompletionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session {} on {}", self.session_id, self.date)
    }
}

/// Everything produced by one completion, for the caller to persist and show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionPayload {
    pub key: CompletionKey,
    pub summary: PerformanceSummary,
    pub streak_result: StreakResult,
    pub reward_result: RewardResult,
    pub new_badges: Vec<UnlockedBadge>,
    pub feedback_signals: FeedbackSignals,
    /// False when feedback had already been recorded for this day.
    pub feedback_recorded: bool,
    /// Profile after this completion was applied.
    pub profile: GamificationProfile,
    pub events: Vec<Event>,
    pub completed_at: DateTime<Utc>,
}

impl CompletionPayload {
    /// Events meant for push / in-app delivery.
    pub fn notifications(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_notification())
    }

    pub fn deliver(&self, notifier: &dyn Notifier) {
        for event in self.notifications() {
            notifier.notify(event);
        }
    }
}

/// Completions already applied for a user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompletionLedger {
    entries: Vec<CompletionPayload>,
}

impl CompletionLedger {
    pub fn get(&self, key: &CompletionKey) -> Option<&CompletionPayload> {
        self.entries.iter().find(|p| p.key == *key)
    }

    pub fn contains(&self, key: &CompletionKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn newest_date(&self) -> Option<NaiveDate> {
        self.entries.iter().map(|p| p.key.date).max()
    }

    /// Drop entries older than `date`.
    pub fn prune_before(&mut self, date: NaiveDate) {
        self.entries.retain(|p| p.key.date >= date);
    }

    fn insert(&mut self, payload: CompletionPayload) {
        self.entries.push(payload);
    }
}

/// Apply one finished session to `progress`.
///
/// # Errors
/// - `DuplicateSubmission` if `key` was already applied; `progress` is untouched.
/// - `Validation` if `feedback` is out of range; `progress` is untouched.
pub fn run_completion_pipeline(
    key: CompletionKey,
    summary: &PerformanceSummary,
    feedback: &Feedback,
    progress: &mut UserProgress,
    catalog: &BadgeCatalog,
    config: &EngineConfig,
    at: DateTime<Utc>,
) -> Result<CompletionPayload> {
    if progress.ledger.contains(&key) {
        return Err(EngineError::DuplicateSubmission { key });
    }
    feedback.validate()?;

    let threshold = config.streak.completion_threshold_pct;
    let before = &progress.profile;

    let streak_result = accumulate_streak(StreakInput {
        last_workout_date: before.last_workout_date,
        today: key.date,
        current_streak: before.streak,
        longest_streak: before.longest_streak,
        meets_threshold: summary.meets_threshold(threshold),
    });

    let reward_result = calculate_reward(
        summary,
        feedback,
        before.xp,
        before.level,
        threshold,
        &config.rewards,
    );

    let profile = GamificationProfile {
        streak: streak_result.current_streak,
        longest_streak: streak_result.longest_streak,
        last_workout_date: streak_result.last_workout_date,
        total_workouts: before.total_workouts.saturating_add(1),
        level: reward_result.new_level,
        xp: reward_result.new_xp,
    };

    let new_badges = evaluate_badges(catalog, &progress.badges, &profile, at);
    let feedback_signals = derive_signals(feedback);
    let feedback_recorded = progress.feedback_for(key.date).is_none();

    let mut events = Vec::new();
    if streak_result.grew_from(before.streak) {
        if let Some(streak) = milestone_reached(
            before.streak,
            streak_result.current_streak,
            &config.streak.milestones,
        ) {
            events.push(Event::StreakMilestone { streak, at });
        }
    }
    events.extend(new_badges.iter().map(|u| Event::BadgeUnlocked {
        badge_id: u.badge.id.clone(),
        name: u.badge.name.clone(),
        rarity: u.badge.rarity,
        at,
    }));
    if reward_result.level_up {
        events.push(Event::LevelUp {
            level: reward_result.new_level,
            at,
        });
    }

    let payload = CompletionPayload {
        key,
        summary: summary.clone(),
        streak_result,
        reward_result,
        new_badges,
        feedback_signals,
        feedback_recorded,
        profile: profile.clone(),
        events,
        completed_at: at,
    };

    // Commit.
    progress.profile = profile;
    for unlocked in &payload.new_badges {
        progress.badges.unlock(&unlocked.badge.id, unlocked.unlocked_at);
    }
    if feedback_recorded {
        progress.feedback_log.insert(key.date, feedback.clone());
    } else {
        debug!(date = %key.date, "feedback already recorded today, keeping the first");
    }
    progress.ledger.insert(payload.clone());
    if let Some(cutoff) = progress
        .ledger
        .newest_date()
        .and_then(|d| d.checked_sub_days(Days::new(LEDGER_RETENTION_DAYS)))
    {
        progress.ledger.prune_before(cutoff);
    }

    info!(
        %key,
        xp_gain = payload.reward_result.xp_gain,
        streak = payload.profile.streak,
        badges = payload.new_badges.len(),
        "completion applied"
    );
    Ok(payload)
}
