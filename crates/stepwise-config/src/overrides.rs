//! Command-line and environment overrides layered on top of the run file.

use tracing::debug;

use crate::config::RunConfig;

/// Options supplied outside the run file. `None` / empty leaves the file's
/// value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Tried before the configured (or default) candidates.
    pub log_paths: Vec<String>,
    /// Added to `[run] skip`.
    pub skip: Vec<String>,
    /// Replaces `[run] only` when non-empty.
    pub only: Vec<String>,
    /// Added to `[run] force`.
    pub force: Vec<String>,
    pub best_effort: bool,
    pub retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

impl RunConfig {
    /// Layer `overrides` onto this configuration.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        extend_unique(&mut self.log_path_overrides, &overrides.log_paths);
        extend_unique(&mut self.run.skip, &overrides.skip);
        if !overrides.only.is_empty() {
            self.run.only = overrides.only.clone();
        }
        extend_unique(&mut self.run.force, &overrides.force);
        if overrides.best_effort {
            self.run.stop_on_required_failure = false;
        }
        if let Some(retries) = overrides.retries {
            self.run.retries = retries;
        }
        if let Some(delay) = overrides.retry_delay_ms {
            self.run.retry_delay_ms = delay;
        }
        debug!(?overrides, "overrides applied");
    }
}

fn extend_unique(target: &mut Vec<String>, extra: &[String]) {
    for item in extra {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}
