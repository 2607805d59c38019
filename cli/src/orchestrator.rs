//! Wiring: run file + overrides → registry → selection → sink → executor.
//!
//! Everything that can abort the process happens in `Orchestrator::new` and
//! log sink initialization, before the first step runs.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use stepwise_config::{Overrides, RunConfig};
use stepwise_contracts::{
    error::{StepwiseError, StepwiseResult},
    run::RunReport,
};
use stepwise_core::{traits::Step, Executor, StepRegistry};
use stepwise_log::{candidates, FileLogSink, MemoryLogSink};
use stepwise_steps::{build_registry, Collaborators};

/// A loaded, validated run ready to execute.
pub struct Orchestrator {
    config: RunConfig,
    registry: StepRegistry,
}

impl Orchestrator {
    /// Load `path`, layer `overrides`, and build the command-backed registry.
    pub fn load(path: &Path, overrides: &Overrides) -> StepwiseResult<Self> {
        let mut config = RunConfig::from_file(path)?;
        config.apply_overrides(overrides);
        let collaborators = Collaborators::from_backend(&config.backend);
        Self::new(config, &collaborators)
    }

    /// Build the registry and reject selections naming unknown steps.
    pub fn new(config: RunConfig, collaborators: &Collaborators) -> StepwiseResult<Self> {
        let registry = build_registry(&config, collaborators)?;
        config.selection().validate(&registry)?;

        let unknown: Vec<&str> = config
            .run
            .force
            .iter()
            .map(String::as_str)
            .filter(|name| registry.get(name).is_none())
            .collect();
        if !unknown.is_empty() {
            return Err(StepwiseError::ConfigError {
                reason: format!("cannot force unknown step: {}", unknown.join(", ")),
            });
        }

        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Selected steps, in registration order.
    pub fn selected(&self) -> Vec<&dyn Step> {
        self.config.selection().select(&self.registry)
    }

    /// Provision for real (or dry-run) with a file-backed log.
    pub fn run(&self, dry_run: bool) -> StepwiseResult<RunReport> {
        let paths = resolve_log_candidates(&self.config.log_candidates())?;
        let sink = FileLogSink::initialize(&paths)?;

        let mut policy = self.config.policy();
        policy.dry_run = dry_run;
        Ok(Executor::new(policy).run(&self.selected(), &sink))
    }

    /// Evaluate preconditions only, logging to the console.
    pub fn plan(&self) -> RunReport {
        let mut policy = self.config.policy();
        policy.dry_run = true;
        Executor::new(policy).run(&self.selected(), &MemoryLogSink::echoing())
    }
}

/// Expand every configured candidate; unusable ones are skipped with a warning.
///
/// Fails with `LoggingUnavailable` when no candidate survives expansion.
pub fn resolve_log_candidates(raw: &[String]) -> StepwiseResult<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();
    for candidate in raw {
        match candidates::expand(candidate) {
            Ok(path) => paths.push(path),
            Err(reason) => {
                warn!(candidate = %candidate, %reason, "log candidate skipped");
                rejected.push(reason);
            }
        }
    }
    if paths.is_empty() {
        return Err(StepwiseError::LoggingUnavailable {
            reason: if rejected.is_empty() {
                "no log path candidates configured".to_string()
            } else {
                rejected.join("; ")
            },
        });
    }
    Ok(paths)
}

/// Write `report` as pretty JSON to `path`.
pub fn write_report_json(report: &RunReport, path: &Path) -> StepwiseResult<()> {
    let json = serde_json::to_string_pretty(report).map_err(|e| StepwiseError::ConfigError {
        reason: format!("failed to serialize run report: {}", e),
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| report_io_error(path, e))?;
    }
    fs::write(path, json).map_err(|e| report_io_error(path, e))
}

fn report_io_error(path: &Path, e: std::io::Error) -> StepwiseError {
    StepwiseError::CollaboratorFailed {
        operation: "report write".to_string(),
        reason: format!("{}: {}", path.display(), e),
    }
}
