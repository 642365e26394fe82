//! Per-task outcomes and batch summaries
//!
//! A task's result is always reified as data at its original index: a
//! success value or a failure record. Failures carry the task's index and a
//! classification so the caller can tell an ordinary error from a timeout or
//! a panic.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a task failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The task returned an error
    Error,
    /// The task exceeded the configured per-task deadline
    TimedOut,
    /// The task body panicked
    Panicked,
}

/// A single task's failure record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// Index of the failing task in the input batch
    pub index: usize,
    /// Failure classification
    pub kind: FailureKind,
    /// Human-readable description
    pub message: String,
}

impl TaskFailure {
    /// Create a failure record for the task at `index`
    pub fn new(index: usize, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task {} failed ({:?}): {}", self.index, self.kind, self.message)
    }
}

/// Outcome of one task: a success value or a failure record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskOutcome<R> {
    /// The task produced a value
    Success(R),
    /// The task failed; siblings are unaffected
    Failure(TaskFailure),
}

impl<R> TaskOutcome<R> {
    /// Whether this outcome is a success
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    /// Whether this outcome is a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failure(_))
    }

    /// The success value, if any
    pub fn success(&self) -> Option<&R> {
        match self {
            TaskOutcome::Success(value) => Some(value),
            TaskOutcome::Failure(_) => None,
        }
    }

    /// The failure record, if any
    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            TaskOutcome::Success(_) => None,
            TaskOutcome::Failure(failure) => Some(failure),
        }
    }

    /// Consume the outcome, returning the success value if any
    pub fn into_success(self) -> Option<R> {
        match self {
            TaskOutcome::Success(value) => Some(value),
            TaskOutcome::Failure(_) => None,
        }
    }

    /// Convert into a standard `Result`
    pub fn into_result(self) -> std::result::Result<R, TaskFailure> {
        match self {
            TaskOutcome::Success(value) => Ok(value),
            TaskOutcome::Failure(failure) => Err(failure),
        }
    }
}

/// Aggregate statistics for one completed batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of tasks in the batch
    pub total: usize,
    /// Tasks that produced a value
    pub succeeded: usize,
    /// Tasks that failed with an error or panic
    pub failed: usize,
    /// Tasks that exceeded the per-task deadline
    pub timed_out: usize,
    /// Wall-clock duration of the batch in milliseconds
    pub duration_ms: u128,
    /// When the batch completed
    pub completed_at: DateTime<Utc>,
}

impl BatchSummary {
    /// Compute a summary from a slice of outcomes
    pub fn from_outcomes<R>(outcomes: &[TaskOutcome<R>]) -> Self {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut timed_out = 0;

        for outcome in outcomes {
            match outcome {
                TaskOutcome::Success(_) => succeeded += 1,
                TaskOutcome::Failure(f) if f.kind == FailureKind::TimedOut => timed_out += 1,
                TaskOutcome::Failure(_) => failed += 1,
            }
        }

        Self {
            total: outcomes.len(),
            succeeded,
            failed,
            timed_out,
            duration_ms: 0,
            completed_at: Utc::now(),
        }
    }

    /// Attach the batch's wall-clock duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis();
        self
    }
}
