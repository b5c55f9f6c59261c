//! Per-set record of what was actually performed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::plan::Phase;

/// Position of one set within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SetKey {
    pub phase: Phase,
    pub exercise_index: usize,
    pub set_index: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActualPerformance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ActualPerformance {
    /// A completed set of `reps` repetitions.
    pub fn reps(reps: u32) -> Self {
        Self {
            reps: Some(reps),
            completed: true,
            ..Default::default()
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub(crate) fn validate_weight(&self) -> Result<(), ValidationError> {
        match self.weight {
            Some(w) if !w.is_finite() || w < 0.0 => Err(ValidationError::InvalidValue {
                field: "weight".into(),
                message: format!("{w} is not a valid load"),
            }),
            _ => Ok(()),
        }
    }
}

/// One row of the serialized log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(flatten)]
    pub key: SetKey,
    #[serde(flatten)]
    pub actual: ActualPerformance,
}

/// Planned-vs-actual log for one session.
///
/// Entries are only ever inserted or overwritten while the session runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<LogEntry>", into = "Vec<LogEntry>")]
pub struct PerformanceLog {
    entries: BTreeMap<SetKey, ActualPerformance>,
}

impl PerformanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record at `key`. Returns the previous record.
    pub fn record(&mut self, key: SetKey, actual: ActualPerformance) -> Option<ActualPerformance> {
        self.entries.insert(key, actual)
    }

    pub fn get(&self, key: &SetKey) -> Option<&ActualPerformance> {
        self.entries.get(key)
    }

    pub fn is_completed(&self, key: &SetKey) -> bool {
        self.entries.get(key).is_some_and(|a| a.completed)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SetKey, &ActualPerformance)> {
        self.entries.iter()
    }

    /// Records for one exercise, ordered by set.
    pub fn for_exercise(
        &self,
        phase: Phase,
        exercise_index: usize,
    ) -> impl Iterator<Item = (&SetKey, &ActualPerformance)> {
        self.entries
            .iter()
            .filter(move |(k, _)| k.phase == phase && k.exercise_index == exercise_index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<LogEntry>> for PerformanceLog {
    fn from(entries: Vec<LogEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.key, e.actual)).collect(),
        }
    }
}

impl From<PerformanceLog> for Vec<LogEntry> {
    fn from(log: PerformanceLog) -> Self {
        log.entries
            .into_iter()
            .map(|(key, actual)| LogEntry { key, actual })
            .collect()
    }
}
