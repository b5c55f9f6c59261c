//! # Fitstreak Core Library
//!
//! The workout session and progress gamification engine behind the
//! `fitstreak` CLI. The library holds no durable state: callers load a
//! [`UserProgress`], drive a session, and store what comes back.
//!
//! ## Architecture
//!
//! - **Plan**: workout plan model, range validation and generator fallback
//! - **Session**: a tick-driven state machine that walks warm-up, main and
//!   cool-down phases while capturing per-set performance
//! - **Gamification**: the completion pipeline turning a finished session
//!   into streak, XP/level and badge changes plus feedback signals
//! - **Config**: TOML-based tunables for all of the above
//!
//! ## Key Components
//!
//! - [`SessionController`]: Session state machine
//! - [`run_completion_pipeline`]: Streak → reward → badges → signals
//! - [`resolve_plan`]: Generator call with deterministic fallback
//! - [`EngineConfig`]: Engine configuration management

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod gamification;
pub mod plan;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{data_dir, EngineConfig};
pub use error::{ConfigError, EngineError, Result, ValidationError};
pub use events::{Event, LogNotifier, Notifier};
pub use gamification::{
    run_completion_pipeline, BadgeCatalog, CompletionKey, CompletionPayload, Feedback,
    GamificationProfile, UserProgress,
};
pub use plan::{resolve_plan, validate_plan, ExerciseSpec, Phase, RepTarget, WorkoutPlan};
pub use session::{
    AbortedSession, ActiveSessions, ActualPerformance, PerformanceSummary, SessionController,
    SessionState, SessionStatus, TimerMode,
};
