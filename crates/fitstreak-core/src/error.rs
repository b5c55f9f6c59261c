//! Core error types for fitstreak-core.
//!
//! The engine distinguishes malformed input, calls made from the wrong
//! session state, duplicate completion submissions and failures of the
//! external workout generator. Everything else is configuration or I/O.

use std::path::PathBuf;
use thiserror::Error;

use crate::gamification::CompletionKey;

/// Core error type for fitstreak-core.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed input (missing reps, rating outside 1-5, invalid plan).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Operation attempted from an incompatible session state.
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    /// The completion pipeline already ran for this key.
    #[error("Completion already recorded for {key}")]
    DuplicateSubmission { key: CompletionKey },

    /// The workout generator failed or returned an unusable plan.
    #[error("External service error for '{service}': {message}")]
    ExternalService { service: String, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn invalid_state(operation: &'static str, state: impl ToString) -> Self {
        EngineError::InvalidState {
            operation,
            state: state.to_string(),
        }
    }

    /// Whether this error is a contract violation by the caller rather than
    /// something to show the end user.
    pub fn is_programmer_facing(&self) -> bool {
        !matches!(self, EngineError::ExternalService { .. })
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No usable data directory
    #[error("Cannot determine data directory")]
    NoDataDir,
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A main-phase set was recorded without a rep count.
    #[error("Reps are required for '{exercise}' in the main phase")]
    MissingReps { exercise: String },

    /// A feedback rating outside 1-5.
    #[error("Rating '{field}' must be between 1 and 5, got {value}")]
    RatingOutOfRange { field: &'static str, value: u8 },

    /// A plan without any main-phase exercise.
    #[error("Workout plan has no main exercises")]
    EmptyPlan,

    /// Out of bounds
    #[error("{field} = {value} is outside {min}..={max} for '{exercise}'")]
    OutOfBounds {
        exercise: String,
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for EngineError
pub type Result<T, E = EngineError> = std::result::Result<T, E>;
