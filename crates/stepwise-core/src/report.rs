//! Run report finalization and the console summary table.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};

use stepwise_contracts::{
    run::{OverallStatus, RunId, RunReport},
    step::{StepOutcome, StepStatus},
};

/// `Failed` if any outcome failed, else `SuccessWithWarnings` if any warned,
/// else `Success`. An empty run is a success.
pub fn overall_status(outcomes: &[StepOutcome]) -> OverallStatus {
    if outcomes.iter().any(|o| o.status == StepStatus::Failed) {
        OverallStatus::Failed
    } else if outcomes.iter().any(|o| o.status == StepStatus::Warned) {
        OverallStatus::SuccessWithWarnings
    } else {
        OverallStatus::Success
    }
}

/// Seal the accumulated outcomes into a read-only `RunReport`.
pub fn finalize(
    run_id: RunId,
    outcomes: Vec<StepOutcome>,
    started_at: DateTime<Utc>,
    aborted: bool,
    log_path: Option<PathBuf>,
) -> RunReport {
    RunReport {
        run_id,
        overall_status: overall_status(&outcomes),
        outcomes,
        started_at,
        finished_at: Utc::now(),
        aborted,
        log_path,
    }
}

/// Per-status tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub skipped: usize,
    pub succeeded: usize,
    pub warned: usize,
    pub failed: usize,
}

pub fn counts(outcomes: &[StepOutcome]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for outcome in outcomes {
        match outcome.status {
            StepStatus::Skipped => counts.skipped += 1,
            StepStatus::Succeeded => counts.succeeded += 1,
            StepStatus::Warned => counts.warned += 1,
            StepStatus::Failed => counts.failed += 1,
        }
    }
    counts
}

/// The aggregate status line printed after the table.
pub fn status_line(report: &RunReport) -> String {
    let c = counts(&report.outcomes);
    let mut line = format!(
        "Provisioning {}: {} succeeded, {} skipped, {} warned, {} failed",
        report.overall_status.describe(),
        c.succeeded,
        c.skipped,
        c.warned,
        c.failed
    );
    if report.aborted {
        line.push_str(" (aborted after required step failure)");
    }
    line
}

/// Render the per-step summary table plus the aggregate status line.
pub fn render_summary(report: &RunReport) -> String {
    let name_width = report
        .outcomes
        .iter()
        .map(|o| o.step_name.len())
        .max()
        .unwrap_or(0)
        .max("STEP".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:<name_width$}  {:<7}  {:>8}  {:>9}  {}\n",
        "STEP", "STATUS", "ATTEMPTS", "DURATION", "MESSAGE"
    ));
    out.push_str(&format!("{}\n", "-".repeat(name_width + 40)));
    for outcome in &report.outcomes {
        out.push_str(&format!(
            "{:<name_width$}  {:<7}  {:>8}  {:>9}  {}\n",
            outcome.step_name,
            outcome.status.label(),
            outcome.attempts,
            format_duration(outcome.duration),
            first_line(&outcome.message),
        ));
    }
    out.push('\n');
    out.push_str(&status_line(report));
    out.push('\n');
    if let Some(path) = &report.log_path {
        out.push_str(&format!("Log: {}\n", path.display()));
    }
    out
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs >= 60.0 {
        format!("{}m{:02}s", duration.as_secs() / 60, duration.as_secs() % 60)
    } else {
        format!("{:.2}s", secs)
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use stepwise_contracts::{
        run::{OverallStatus, RunId},
        step::{StepOutcome, StepStatus},
    };

    use super::*;

    fn outcome(name: &str, status: StepStatus) -> StepOutcome {
        StepOutcome {
            step_name: name.to_string(),
            status,
            message: format!("{} {}", name, status),
            timestamp: Utc::now(),
            duration: Duration::from_millis(250),
            attempts: u32::from(status != StepStatus::Skipped),
        }
    }

    #[test]
    fn overall_status_failed_wins() {
        let outcomes = vec![
            outcome("a", StepStatus::Succeeded),
            outcome("b", StepStatus::Warned),
            outcome("c", StepStatus::Failed),
        ];
        assert_eq!(overall_status(&outcomes), OverallStatus::Failed);
    }

    #[test]
    fn overall_status_warnings_without_failures() {
        let outcomes = vec![
            outcome("a", StepStatus::Skipped),
            outcome("b", StepStatus::Warned),
        ];
        assert_eq!(overall_status(&outcomes), OverallStatus::SuccessWithWarnings);
    }

    #[test]
    fn overall_status_clean_and_empty_runs_succeed() {
        let outcomes = vec![
            outcome("a", StepStatus::Skipped),
            outcome("b", StepStatus::Succeeded),
        ];
        assert_eq!(overall_status(&outcomes), OverallStatus::Success);
        assert_eq!(overall_status(&[]), OverallStatus::Success);
    }

    #[test]
    fn finalize_keeps_outcome_order() {
        let report = finalize(
            RunId::new(),
            vec![outcome("first", StepStatus::Succeeded), outcome("second", StepStatus::Skipped)],
            Utc::now(),
            false,
            None,
        );
        let names: Vec<&str> = report.outcomes.iter().map(|o| o.step_name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn summary_lists_every_step_and_the_status_line() {
        let report = finalize(
            RunId::new(),
            vec![
                outcome("install-a", StepStatus::Succeeded),
                outcome("install-b", StepStatus::Skipped),
                outcome("install-c", StepStatus::Warned),
            ],
            Utc::now(),
            false,
            Some("/tmp/provision.log".into()),
        );
        let summary = render_summary(&report);

        assert!(summary.contains("install-a"));
        assert!(summary.contains("SKIPPED"));
        assert!(summary.contains("WARNED"));
        assert!(summary.contains("completed with warnings: 1 succeeded, 1 skipped, 1 warned, 0 failed"));
        assert!(summary.contains("Log: /tmp/provision.log"));
    }

    #[test]
    fn status_line_mentions_abort() {
        let report = finalize(
            RunId::new(),
            vec![outcome("install-a", StepStatus::Failed)],
            Utc::now(),
            true,
            None,
        );
        assert!(status_line(&report).contains("aborted"));
    }

    #[test]
    fn durations_over_a_minute_use_minutes() {
        assert_eq!(format_duration(Duration::from_secs(125)), "2m05s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }
}
