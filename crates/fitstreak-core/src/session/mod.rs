//! Live workout sessions: the controller state machine, its performance
//! log and the summary produced at the end.

mod controller;
mod log;
mod registry;
mod summary;

pub use controller::{AbortedSession, SessionController, SessionState, SessionStatus, TimerMode};
pub use log::{ActualPerformance, LogEntry, PerformanceLog, SetKey};
pub use registry::ActiveSessions;
pub use summary::{completion_percentage, PerformanceSummary};
