//! One active session per user.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::controller::SessionController;
use crate::clock::Clock;
use crate::error::{EngineError, Result};
use crate::events::Event;
use crate::plan::WorkoutPlan;

/// Tracks which users currently have a session running.
///
/// Only ids are kept; the controller itself is owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActiveSessions {
    active: BTreeMap<String, Uuid>,
}

impl ActiveSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self, user: &str) -> Option<Uuid> {
        self.active.get(user).copied()
    }

    /// Create and start a session for `user`.
    ///
    /// # Errors
    /// `InvalidState` if `user` already has a running session, or whatever
    /// [`SessionController::start`] rejects.
    pub fn start<'p>(
        &mut self,
        user: &str,
        plan: &'p WorkoutPlan,
        clock: Arc<dyn Clock>,
    ) -> Result<(SessionController<'p>, Vec<Event>)> {
        if let Some(existing) = self.active(user) {
            return Err(EngineError::invalid_state(
                "start",
                format!("already running ({existing})"),
            ));
        }
        let mut controller = SessionController::with_clock(plan, clock);
        let events = controller.start()?;
        self.active.insert(user.to_string(), controller.session_id());
        debug!(user, session_id = %controller.session_id(), "session registered");
        Ok((controller, events))
    }

    /// Forget `user`'s session. Returns false when `session_id` is not the
    /// one registered, leaving the registry unchanged.
    pub fn release(&mut self, user: &str, session_id: Uuid) -> bool {
        if self.active(user) == Some(session_id) {
            self.active.remove(user);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::plan::{ExerciseSpec, RepTarget};

    fn plan() -> WorkoutPlan {
        WorkoutPlan {
            title: "Quick".into(),
            estimated_duration_min: 10,
            warmup: vec![],
            main: vec![ExerciseSpec::new("Squat", 1, RepTarget::Count(10), 30)],
            cooldown: vec![],
        }
    }

    #[test]
    fn second_start_for_same_user_is_rejected() {
        let plan = plan();
        let mut sessions = ActiveSessions::new();
        let (first, _) = sessions.start("ana", &plan, Arc::new(SystemClock)).unwrap();
        let err = sessions.start("ana", &plan, Arc::new(SystemClock)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState { .. }));
        assert!(sessions.start("ben", &plan, Arc::new(SystemClock)).is_ok());

        assert!(sessions.release("ana", first.session_id()));
        assert!(sessions.start("ana", &plan, Arc::new(SystemClock)).is_ok());
    }

    #[test]
    fn release_ignores_stale_session_id() {
        let plan = plan();
        let mut sessions = ActiveSessions::new();
        sessions.start("ana", &plan, Arc::new(SystemClock)).unwrap();
        assert!(!sessions.release("ana", Uuid::new_v4()));
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn failed_start_registers_nothing() {
        let empty = WorkoutPlan {
            title: String::new(),
            estimated_duration_min: 10,
            warmup: vec![],
            main: vec![],
            cooldown: vec![],
        };
        let mut sessions = ActiveSessions::new();
        assert!(sessions.start("ana", &empty, Arc::new(SystemClock)).is_err());
        assert!(sessions.is_empty());
    }
}
