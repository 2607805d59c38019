//! Per-step types: precondition results and recorded outcomes.
//!
//! `Precondition` is what a step's idempotency check returns.
//! `StepOutcome` is what the executor records, exactly one per executed step.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a step's side-effect-free idempotency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precondition {
    /// The desired end state already holds; the action must not run.
    AlreadySatisfied,
    /// The action has to run to reach the desired end state.
    NeedsAction,
}

/// Final status of one executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepStatus {
    /// Precondition reported `AlreadySatisfied` (or the run was a dry run).
    Skipped,
    /// The action completed cleanly.
    Succeeded,
    /// A non-required step failed; the run continued.
    Warned,
    /// A required step failed.
    Failed,
}

impl StepStatus {
    /// Fixed-width label used in the summary table.
    pub fn label(self) -> &'static str {
        match self {
            StepStatus::Skipped => "SKIPPED",
            StepStatus::Succeeded => "OK",
            StepStatus::Warned => "WARNED",
            StepStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An immutable record of one executed step.
///
/// Created once by the executor and then owned by the `RunReport`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Name of the step this outcome belongs to.
    pub step_name: String,
    pub status: StepStatus,
    /// Human-readable detail: skip reason, success note, or captured error.
    pub message: String,
    /// Wall-clock time (UTC) the outcome was recorded.
    pub timestamp: DateTime<Utc>,
    /// Time spent on the precondition and every action attempt.
    pub duration: Duration,
    /// How many times the action was invoked. Zero for skipped steps.
    pub attempts: u32,
}
