//! Run identity, execution policy, and the finalized run report.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::step::StepOutcome;

/// Unique identifier for one provisioning run.
///
/// Written into the log header and the JSON report so a log file shared by
/// several runs can be split back apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    /// Create a new, unique run ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// How the executor treats failures, retries, forced steps, and dry runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPolicy {
    /// Abort the remaining sequence after a required step fails.
    /// `false` is best-effort mode.
    pub stop_on_required_failure: bool,
    /// Extra attempts after a failed action (0 = run once).
    pub retries: u32,
    /// Pause between attempts.
    pub retry_delay: Duration,
    /// Step names whose precondition is bypassed for this run.
    pub force: BTreeSet<String>,
    /// Evaluate preconditions only; never invoke actions.
    pub dry_run: bool,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            stop_on_required_failure: true,
            retries: 0,
            retry_delay: Duration::ZERO,
            force: BTreeSet::new(),
            dry_run: false,
        }
    }
}

impl ExecutionPolicy {
    /// The opt-in policy that keeps going after required failures.
    pub fn best_effort() -> Self {
        Self {
            stop_on_required_failure: false,
            ..Self::default()
        }
    }

    pub fn is_forced(&self, step_name: &str) -> bool {
        self.force.contains(step_name)
    }
}

/// Aggregate result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallStatus {
    Success,
    SuccessWithWarnings,
    Failed,
}

impl OverallStatus {
    /// Process exit code for a CLI wrapper. Warnings are non-fatal.
    pub fn exit_code(self) -> i32 {
        match self {
            OverallStatus::Success | OverallStatus::SuccessWithWarnings => 0,
            OverallStatus::Failed => 1,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            OverallStatus::Success => "completed successfully",
            OverallStatus::SuccessWithWarnings => "completed with warnings",
            OverallStatus::Failed => "failed",
        }
    }
}

/// The finalized, read-only summary of a provisioning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    /// One entry per executed step, in execution order.
    pub outcomes: Vec<StepOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub overall_status: OverallStatus,
    /// True when a required failure stopped the sequence before its end.
    pub aborted: bool,
    /// The log file the run was recorded to, when a file sink was used.
    pub log_path: Option<PathBuf>,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        self.overall_status.exit_code()
    }
}
