//! Session controller implementation.
//!
//! The controller is a cooperative state machine. It does not use internal
//! threads or timers - the caller drives the rest countdown with `tick()`.
//!
//! ## State Transitions
//!
//! ```text
//! NotStarted -> InProgress(phase, exercise, set, Active) <-> Resting
//!            -> ... warmup -> main -> cooldown ... -> Complete -> Finished
//!                                          (any) -> Aborted
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = SessionController::new(&plan);
//! session.start()?;
//! session.record_set(ActualPerformance::reps(10))?;
//! session.tick(1_000)?; // while resting
//! let payload = session.finish(&feedback, &mut progress, today, &config, &catalog)?;
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::log::{ActualPerformance, PerformanceLog, SetKey};
use super::summary::PerformanceSummary;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result, ValidationError};
use crate::events::Event;
use crate::gamification::{
    run_completion_pipeline, BadgeCatalog, CompletionKey, CompletionPayload, Feedback,
    UserProgress,
};
use crate::plan::{ExerciseSpec, Phase, WorkoutPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    /// Cooldown's last exercise is done; waiting for `finish()`.
    Complete,
    Finished,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Active,
    Resting,
    Idle,
}

/// Live state of one session. Mutated only by [`SessionController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub phase: Phase,
    pub exercise_index: usize,
    pub set_index: usize,
    pub timer_mode: TimerMode,
    pub remaining_rest_seconds: u32,
    /// Session clock in milliseconds, advanced only by `tick()`.
    #[serde(default)]
    pub clock_ms: u64,
    /// Absolute end of the current rest on the session clock.
    #[serde(default)]
    pub rest_ends_at_ms: Option<u64>,
    #[serde(default)]
    pub session_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub performance_log: PerformanceLog,
    /// Key under which this session's completion was applied.
    #[serde(default)]
    pub completion_key: Option<CompletionKey>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            status: SessionStatus::NotStarted,
            phase: Phase::Warmup,
            exercise_index: 0,
            set_index: 0,
            timer_mode: TimerMode::Idle,
            remaining_rest_seconds: 0,
            clock_ms: 0,
            rest_ends_at_ms: None,
            session_started_at: None,
            performance_log: PerformanceLog::new(),
            completion_key: None,
        }
    }

    fn describe(&self) -> &'static str {
        match (self.status, self.timer_mode) {
            (SessionStatus::NotStarted, _) => "not started",
            (SessionStatus::InProgress, TimerMode::Resting) => "resting",
            (SessionStatus::InProgress, _) => "active",
            (SessionStatus::Complete, _) => "complete",
            (SessionStatus::Finished, _) => "finished",
            (SessionStatus::Aborted, _) => "aborted",
        }
    }

    fn current_key(&self) -> SetKey {
        SetKey {
            phase: self.phase,
            exercise_index: self.exercise_index,
            set_index: self.set_index,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// What is left of a session after `abort()`.
///
/// The engine keeps nothing; the caller decides whether to store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbortedSession {
    pub session_id: Uuid,
    pub partial_summary: PerformanceSummary,
    pub performance_log: PerformanceLog,
    pub event: Event,
}

/// Drives one workout through its phases.
///
/// Borrows the plan: the plan must outlive the session and cannot change
/// while it runs.
pub struct SessionController<'p> {
    plan: &'p WorkoutPlan,
    state: SessionState,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionController<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("plan", &self.plan)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'p> SessionController<'p> {
    pub fn new(plan: &'p WorkoutPlan) -> Self {
        Self::with_clock(plan, Arc::new(SystemClock))
    }

    pub fn with_clock(plan: &'p WorkoutPlan, clock: Arc<dyn Clock>) -> Self {
        Self::resume(plan, SessionState::new(), clock)
    }

    /// Rehydrate a controller from a previously persisted state.
    pub fn resume(plan: &'p WorkoutPlan, state: SessionState, clock: Arc<dyn Clock>) -> Self {
        Self { plan, state, clock }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> Uuid {
        self.state.session_id
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn plan(&self) -> &'p WorkoutPlan {
        self.plan
    }

    pub fn current_exercise(&self) -> Option<&'p ExerciseSpec> {
        if self.state.status != SessionStatus::InProgress {
            return None;
        }
        self.plan.exercise(self.state.phase, self.state.exercise_index)
    }

    pub fn performance_log(&self) -> &PerformanceLog {
        &self.state.performance_log
    }

    /// Seconds since `start()`, measured on the wall clock.
    pub fn elapsed_seconds(&self) -> u64 {
        self.state.session_started_at.map_or(0, |started| {
            u64::try_from((self.clock.now() - started).num_seconds()).unwrap_or(0)
        })
    }

    pub fn summary(&self) -> PerformanceSummary {
        PerformanceSummary::from_log(
            self.plan,
            &self.state.performance_log,
            self.elapsed_seconds(),
        )
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let summary = self.summary();
        Event::SessionSnapshot {
            session_id: self.state.session_id,
            status: self.state.status,
            phase: self.state.phase,
            exercise_index: self.state.exercise_index,
            set_index: self.state.set_index,
            exercise_name: self.current_exercise().map(|e| e.name.clone()),
            timer_mode: self.state.timer_mode,
            remaining_rest_seconds: self.state.remaining_rest_seconds,
            completed_sets: summary.completed_sets,
            total_sets: summary.total_sets,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// # Errors
    /// `InvalidState` if the session was already started; `Validation` if the
    /// plan has no exercises at all.
    pub fn start(&mut self) -> Result<Vec<Event>> {
        if self.state.status != SessionStatus::NotStarted {
            return Err(EngineError::invalid_state("start", &self.state));
        }
        let phase = self
            .plan
            .first_non_empty_phase(Phase::Warmup)
            .ok_or(ValidationError::EmptyPlan)?;

        let now = self.clock.now();
        self.state.status = SessionStatus::InProgress;
        self.state.phase = phase;
        self.state.exercise_index = 0;
        self.state.set_index = 0;
        self.state.timer_mode = TimerMode::Active;
        self.state.clock_ms = 0;
        self.state.session_started_at = Some(now);

        info!(session_id = %self.state.session_id, %phase, "session started");
        let mut events = vec![Event::SessionStarted {
            session_id: self.state.session_id,
            phase,
            at: now,
        }];
        events.extend(self.exercise_started_event());
        Ok(events)
    }

    /// Record the current set and move on.
    ///
    /// # Errors
    /// `InvalidState` unless a set is active; `Validation` when a main-phase
    /// set has no reps or the weight is not a valid load.
    pub fn record_set(&mut self, actual: ActualPerformance) -> Result<Vec<Event>> {
        if !self.is_active() {
            return Err(EngineError::invalid_state("record a set", &self.state));
        }
        let exercise = self.require_exercise()?;
        if self.state.phase == Phase::Main && actual.reps.is_none() {
            return Err(ValidationError::MissingReps {
                exercise: exercise.name.clone(),
            }
            .into());
        }
        actual.validate_weight()?;

        let key = self.state.current_key();
        let completed = actual.completed;
        if self.state.performance_log.record(key, actual).is_some() {
            debug!(?key, "overwrote previously recorded set");
        }

        let mut events = vec![Event::SetRecorded {
            phase: key.phase,
            exercise_index: key.exercise_index,
            set_index: key.set_index,
            completed,
            at: self.clock.now(),
        }];

        let sets = usize::try_from(exercise.target_sets).unwrap_or(usize::MAX);
        if self.state.set_index + 1 < sets {
            events.extend(self.begin_rest(exercise.rest_seconds));
        } else {
            events.extend(self.advance_exercise());
        }
        Ok(events)
    }

    /// Advance the session clock by `elapsed_ms` and update the rest countdown.
    ///
    /// Remaining time is derived from the absolute rest end, so one late
    /// tick covering the whole rest resolves exactly like many small ones.
    ///
    /// # Errors
    /// `InvalidState` unless resting.
    pub fn tick(&mut self, elapsed_ms: u64) -> Result<Vec<Event>> {
        if !self.is_resting() {
            return Err(EngineError::invalid_state("tick", &self.state));
        }
        self.state.clock_ms = self.state.clock_ms.saturating_add(elapsed_ms);
        let ends_at = self.state.rest_ends_at_ms.unwrap_or(self.state.clock_ms);
        let remaining_ms = ends_at.saturating_sub(self.state.clock_ms);
        let remaining = u32::try_from(remaining_ms.div_ceil(1_000)).unwrap_or(u32::MAX);
        self.state.remaining_rest_seconds = remaining;

        if remaining == 0 {
            Ok(self.end_rest(false))
        } else {
            Ok(vec![Event::RestTicked {
                remaining_seconds: remaining,
            }])
        }
    }

    /// # Errors
    /// `InvalidState` unless resting.
    pub fn skip_rest(&mut self) -> Result<Vec<Event>> {
        if !self.is_resting() {
            return Err(EngineError::invalid_state("skip rest", &self.state));
        }
        Ok(self.end_rest(true))
    }

    /// Step back to the previous exercise of the current phase.
    ///
    /// Does nothing on the first exercise of a phase. Recorded sets are kept;
    /// re-recording a set overwrites it.
    ///
    /// # Errors
    /// `InvalidState` unless the session is in progress.
    pub fn go_back(&mut self) -> Result<Vec<Event>> {
        if self.state.status != SessionStatus::InProgress {
            return Err(EngineError::invalid_state("go back", &self.state));
        }
        if self.state.exercise_index == 0 {
            return Ok(Vec::new());
        }
        self.clear_rest();
        self.state.exercise_index -= 1;
        self.state.set_index = 0;
        self.state.timer_mode = TimerMode::Active;

        debug!(phase = %self.state.phase, exercise_index = self.state.exercise_index, "went back");
        let mut events = vec![Event::WentBack {
            phase: self.state.phase,
            exercise_index: self.state.exercise_index,
            at: self.clock.now(),
        }];
        events.extend(self.exercise_started_event());
        Ok(events)
    }

    /// Stop the session without applying any rewards.
    ///
    /// # Errors
    /// `InvalidState` if the session already finished or was aborted.
    pub fn abort(&mut self) -> Result<AbortedSession> {
        if matches!(
            self.state.status,
            SessionStatus::Finished | SessionStatus::Aborted
        ) {
            return Err(EngineError::invalid_state("abort", &self.state));
        }
        let partial_summary = self.summary();
        self.clear_rest();
        self.state.status = SessionStatus::Aborted;
        self.state.timer_mode = TimerMode::Idle;

        info!(
            session_id = %self.state.session_id,
            completed_sets = partial_summary.completed_sets,
            "session aborted"
        );
        let event = Event::SessionAborted {
            session_id: self.state.session_id,
            completed_sets: partial_summary.completed_sets,
            at: self.clock.now(),
        };
        Ok(AbortedSession {
            session_id: self.state.session_id,
            partial_summary,
            performance_log: self.state.performance_log.clone(),
            event,
        })
    }

    /// Summarize the session and run the completion pipeline once.
    ///
    /// A repeated call for the same `(session, today)` returns the payload
    /// of the first call and changes nothing.
    ///
    /// # Errors
    /// `InvalidState` before the session is complete; `Validation` for bad
    /// feedback, in which case nothing is committed and `finish` may be
    /// called again.
    pub fn finish(
        &mut self,
        feedback: &Feedback,
        progress: &mut UserProgress,
        today: NaiveDate,
        config: &EngineConfig,
        catalog: &BadgeCatalog,
    ) -> Result<CompletionPayload> {
        let key = CompletionKey {
            session_id: self.state.session_id,
            date: today,
        };

        match self.state.status {
            SessionStatus::Complete => {}
            SessionStatus::Finished => {
                let applied = self.state.completion_key.unwrap_or(key);
                return match progress.ledger.get(&applied) {
                    Some(payload) => {
                        warn!(%applied, "duplicate finish ignored");
                        Ok(payload.clone())
                    }
                    None => Err(EngineError::invalid_state("finish", &self.state)),
                };
            }
            _ => return Err(EngineError::invalid_state("finish", &self.state)),
        }

        let summary = self.summary();
        let outcome = run_completion_pipeline(
            key,
            &summary,
            feedback,
            progress,
            catalog,
            config,
            self.clock.now(),
        );

        let payload = match outcome {
            Ok(payload) => payload,
            Err(EngineError::DuplicateSubmission { key }) => {
                warn!(%key, "completion already applied, returning recorded result");
                progress
                    .ledger
                    .get(&key)
                    .cloned()
                    .ok_or(EngineError::DuplicateSubmission { key })?
            }
            Err(e) => return Err(e),
        };

        self.state.status = SessionStatus::Finished;
        self.state.timer_mode = TimerMode::Idle;
        self.state.completion_key = Some(key);
        info!(
            session_id = %self.state.session_id,
            completion_percentage = payload.summary.completion_percentage,
            "session finished"
        );
        Ok(payload)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn is_active(&self) -> bool {
        self.state.status == SessionStatus::InProgress && self.state.timer_mode == TimerMode::Active
    }

    fn is_resting(&self) -> bool {
        self.state.status == SessionStatus::InProgress
            && self.state.timer_mode == TimerMode::Resting
    }

    fn require_exercise(&self) -> Result<&'p ExerciseSpec> {
        self.plan
            .exercise(self.state.phase, self.state.exercise_index)
            .ok_or_else(|| {
                ValidationError::InvalidValue {
                    field: "exercise_index".into(),
                    message: format!(
                        "{} has no exercise {}",
                        self.state.phase, self.state.exercise_index
                    ),
                }
                .into()
            })
    }

    fn begin_rest(&mut self, rest_seconds: u32) -> Vec<Event> {
        if rest_seconds == 0 {
            self.state.set_index += 1;
            self.state.timer_mode = TimerMode::Active;
            return Vec::new();
        }
        self.state.timer_mode = TimerMode::Resting;
        self.state.remaining_rest_seconds = rest_seconds;
        self.state.rest_ends_at_ms = Some(
            self.state
                .clock_ms
                .saturating_add(u64::from(rest_seconds) * 1_000),
        );
        debug!(rest_seconds, "rest started");
        vec![Event::RestStarted {
            rest_seconds,
            next_set_index: self.state.set_index + 1,
            at: self.clock.now(),
        }]
    }

    fn end_rest(&mut self, skipped: bool) -> Vec<Event> {
        self.clear_rest();
        self.state.set_index += 1;
        self.state.timer_mode = TimerMode::Active;
        debug!(skipped, set_index = self.state.set_index, "rest ended");
        vec![Event::RestEnded {
            skipped,
            at: self.clock.now(),
        }]
    }

    fn clear_rest(&mut self) {
        self.state.remaining_rest_seconds = 0;
        self.state.rest_ends_at_ms = None;
    }

    fn advance_exercise(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        self.state.set_index = 0;

        if self.state.exercise_index + 1 < self.plan.phase(self.state.phase).len() {
            self.state.exercise_index += 1;
            self.state.timer_mode = TimerMode::Active;
            return self.exercise_started_event().into_iter().collect();
        }

        let finished_phase = self.state.phase;
        let mut events = vec![Event::PhaseCompleted {
            phase: finished_phase,
            at: now,
        }];
        self.state.exercise_index = 0;

        match finished_phase
            .next()
            .and_then(|p| self.plan.first_non_empty_phase(p))
        {
            Some(next) => {
                debug!(from = %finished_phase, to = %next, "phase complete");
                self.state.phase = next;
                self.state.timer_mode = TimerMode::Active;
                events.extend(self.exercise_started_event());
            }
            None => {
                self.state.status = SessionStatus::Complete;
                self.state.timer_mode = TimerMode::Idle;
                info!(session_id = %self.state.session_id, "all phases complete");
                events.push(Event::SessionCompleted {
                    session_id: self.state.session_id,
                    at: now,
                });
            }
        }
        events
    }

    fn exercise_started_event(&self) -> Option<Event> {
        let exercise = self.current_exercise()?;
        Some(Event::ExerciseAdvanced {
            phase: self.state.phase,
            exercise_index: self.state.exercise_index,
            exercise_name: exercise.name.clone(),
            at: self.clock.now(),
        })
    }
}
