use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gamification::Rarity;
use crate::plan::Phase;
use crate::session::{SessionStatus, TimerMode};

/// Every state change in the engine produces an Event.
/// The UI renders them; the notifier delivers the reward ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        phase: Phase,
        at: DateTime<Utc>,
    },
    SetRecorded {
        phase: Phase,
        exercise_index: usize,
        set_index: usize,
        completed: bool,
        at: DateTime<Utc>,
    },
    RestStarted {
        rest_seconds: u32,
        next_set_index: usize,
        at: DateTime<Utc>,
    },
    RestTicked {
        remaining_seconds: u32,
    },
    /// Rest finished, by countdown or by skipping.
    RestEnded {
        skipped: bool,
        at: DateTime<Utc>,
    },
    /// A new exercise became active.
    ExerciseAdvanced {
        phase: Phase,
        exercise_index: usize,
        exercise_name: String,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        phase: Phase,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: Uuid,
        at: DateTime<Utc>,
    },
    WentBack {
        phase: Phase,
        exercise_index: usize,
        at: DateTime<Utc>,
    },
    SessionAborted {
        session_id: Uuid,
        completed_sets: u32,
        at: DateTime<Utc>,
    },
    BadgeUnlocked {
        badge_id: String,
        name: String,
        rarity: Rarity,
        at: DateTime<Utc>,
    },
    StreakMilestone {
        streak: u32,
        at: DateTime<Utc>,
    },
    LevelUp {
        level: u32,
        at: DateTime<Utc>,
    },
    SessionSnapshot {
        session_id: Uuid,
        status: SessionStatus,
        phase: Phase,
        exercise_index: usize,
        set_index: usize,
        exercise_name: Option<String>,
        timer_mode: TimerMode,
        remaining_rest_seconds: u32,
        completed_sets: u32,
        total_sets: u32,
    },
}

impl Event {
    /// Whether this event is meant for the notifier (push / in-app).
    pub fn is_notification(&self) -> bool {
        matches!(
            self,
            Event::BadgeUnlocked { .. } | Event::StreakMilestone { .. } | Event::LevelUp { .. }
        )
    }
}

/// Delivery seam for reward events. The engine never calls it itself.
pub trait Notifier {
    fn notify(&self, event: &Event);
}

/// Notifier that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &Event) {
        match event {
            Event::BadgeUnlocked { badge_id, name, .. } => {
                tracing::info!(badge_id, name, "badge unlocked");
            }
            Event::StreakMilestone { streak, .. } => {
                tracing::info!(streak, "streak milestone reached");
            }
            Event::LevelUp { level, .. } => {
                tracing::info!(level, "level up");
            }
            other => tracing::debug!(?other, "ignoring non-notification event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_snake_case_tag() {
        let event = Event::StreakMilestone {
            streak: 7,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "streak_milestone");
        assert_eq!(json["streak"], 7);
        assert!(event.is_notification());
    }

    #[test]
    fn session_events_are_not_notifications() {
        let event = Event::RestTicked {
            remaining_seconds: 5,
        };
        assert!(!event.is_notification());
    }
}
