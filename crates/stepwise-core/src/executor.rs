//! The stepwise executor: a strictly sequential, failure-isolating step runner.
//!
//! Per step:
//!
//!   Precondition → (Skipped | Action → retries → Succeeded | Warned | Failed)
//!
//! Every transition goes to the log sink as it happens, so a run that dies
//! mid-way still leaves a partial trail on disk. Errors and panics raised by a
//! step are caught at the step boundary and recorded in its outcome; the only
//! way a step can stop the run is a required failure under
//! `stop_on_required_failure`.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::Utc;
use tracing::debug;

use stepwise_contracts::{
    error::StepwiseResult,
    log::LogLevel,
    run::{ExecutionPolicy, OverallStatus, RunId, RunReport},
    step::{Precondition, StepOutcome, StepStatus},
};

use crate::{
    report,
    traits::{LogSink, Step, StepContext},
};

/// Runs an ordered list of steps under one `ExecutionPolicy`.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    policy: ExecutionPolicy,
}

impl Executor {
    pub fn new(policy: ExecutionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ExecutionPolicy {
        &self.policy
    }

    /// Run `steps` in order under a fresh `RunId`.
    pub fn run(&self, steps: &[&dyn Step], sink: &dyn LogSink) -> RunReport {
        self.run_with_id(RunId::new(), steps, sink)
    }

    /// Run `steps` in order and return the finalized report.
    ///
    /// The report holds exactly one outcome per executed step. Under the
    /// default policy a required failure ends the sequence; the failing step
    /// is the last outcome and `aborted` is set if steps remained.
    pub fn run_with_id(&self, run_id: RunId, steps: &[&dyn Step], sink: &dyn LogSink) -> RunReport {
        let started_at = Utc::now();
        sink.info(&format!(
            "Run {} starting: {} step(s) selected{}",
            run_id,
            steps.len(),
            if self.policy.dry_run { " (dry run)" } else { "" }
        ));

        let ctx = StepContext { run_id: &run_id, sink };
        let mut outcomes = Vec::with_capacity(steps.len());
        let mut aborted = false;

        for (index, step) in steps.iter().enumerate() {
            let outcome = self.run_step(*step, &ctx);
            let halt = outcome.status == StepStatus::Failed && self.policy.stop_on_required_failure;
            outcomes.push(outcome);

            if halt {
                let remaining = steps.len() - index - 1;
                if remaining > 0 {
                    aborted = true;
                    sink.error(&format!(
                        "Required step '{}' failed; aborting with {} step(s) not run",
                        step.name(),
                        remaining
                    ));
                }
                break;
            }
        }

        let report = report::finalize(
            run_id,
            outcomes,
            started_at,
            aborted,
            sink.active_path().map(|p| p.to_path_buf()),
        );

        let level = match report.overall_status {
            OverallStatus::Success => LogLevel::Success,
            OverallStatus::SuccessWithWarnings => LogLevel::Warning,
            OverallStatus::Failed => LogLevel::Error,
        };
        sink.log(level, &report::status_line(&report));
        report
    }

    /// Execute one step and produce its single outcome.
    fn run_step(&self, step: &dyn Step, ctx: &StepContext<'_>) -> StepOutcome {
        let started = Instant::now();
        let name = step.name();
        let sink = ctx.sink;

        if step.description().is_empty() {
            sink.info(&format!("[{}] starting", name));
        } else {
            sink.info(&format!("[{}] starting: {}", name, step.description()));
        }

        // ── Precondition ─────────────────────────────────────────────────────
        if self.policy.is_forced(name) {
            sink.info(&format!("[{}] forced; precondition bypassed", name));
        } else {
            match isolate(|| step.check(ctx)) {
                Ok(Precondition::AlreadySatisfied) => {
                    sink.info(&format!("[{}] already satisfied; skipping", name));
                    return outcome(name, StepStatus::Skipped, "already satisfied", started, 0);
                }
                Ok(Precondition::NeedsAction) => {
                    debug!(step = %name, "precondition reports action needed");
                }
                Err(reason) => {
                    return self.failure(
                        step,
                        ctx,
                        format!("precondition check failed: {}", reason),
                        started,
                        0,
                    );
                }
            }
        }

        if self.policy.dry_run {
            sink.info(&format!("[{}] dry run: would apply", name));
            return outcome(name, StepStatus::Skipped, "dry run: would apply", started, 0);
        }

        // ── Action with retries ──────────────────────────────────────────────
        let max_attempts = self.policy.retries.saturating_add(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            debug!(step = %name, attempt, max_attempts, "invoking action");
            match isolate(|| step.apply(ctx)) {
                Ok(()) => {
                    sink.success(&format!("[{}] completed", name));
                    let message = if attempt > 1 {
                        format!("completed after {} attempts", attempt)
                    } else {
                        "completed".to_string()
                    };
                    return outcome(name, StepStatus::Succeeded, &message, started, attempt);
                }
                Err(reason) => {
                    last_error = reason;
                    if attempt < max_attempts {
                        sink.warning(&format!(
                            "[{}] attempt {}/{} failed: {}; retrying",
                            name, attempt, max_attempts, last_error
                        ));
                        if !self.policy.retry_delay.is_zero() {
                            std::thread::sleep(self.policy.retry_delay);
                        }
                    }
                }
            }
        }

        self.failure(step, ctx, last_error, started, max_attempts)
    }

    /// Downgrade a step failure to `Warned` or `Failed` per `required`.
    fn failure(
        &self,
        step: &dyn Step,
        ctx: &StepContext<'_>,
        reason: String,
        started: Instant,
        attempts: u32,
    ) -> StepOutcome {
        let name = step.name();
        if step.required() {
            ctx.sink.error(&format!("[{}] failed: {}", name, reason));
            outcome(name, StepStatus::Failed, &reason, started, attempts)
        } else {
            ctx.sink
                .warning(&format!("[{}] failed (not required, continuing): {}", name, reason));
            outcome(name, StepStatus::Warned, &reason, started, attempts)
        }
    }
}

fn outcome(
    name: &str,
    status: StepStatus,
    message: &str,
    started: Instant,
    attempts: u32,
) -> StepOutcome {
    StepOutcome {
        step_name: name.to_string(),
        status,
        message: message.to_string(),
        timestamp: Utc::now(),
        duration: started.elapsed(),
        attempts,
    }
}

/// Call into step code, turning both `Err` and panics into a message.
fn isolate<T>(f: impl FnOnce() -> StepwiseResult<T>) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
