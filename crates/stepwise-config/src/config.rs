//! The run file: policy, log locations, collaborator templates, and steps.
//!
//! `RunConfig` is loaded from TOML, validated once, and then turned into the
//! `ExecutionPolicy`, `Selection`, and log candidates the orchestrator needs.
//!
//! Example:
//! ```toml
//! [run]
//! log_paths = ["$LOCALAPPDATA/devsetup/setup.log", "~/devsetup.log"]
//! stop_on_required_failure = true
//! retries = 1
//! retry_delay_ms = 2000
//! skip = ["wsl"]
//!
//! [backend]
//! package_query = ["choco", "list", "--local-only", "--exact", "{name}"]
//! package_install = ["choco", "install", "-y", "{name}"]
//!
//! [[steps]]
//! name = "install-git"
//! kind = "package-install"
//! package = "git"
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use stepwise_contracts::{
    error::{StepwiseError, StepwiseResult},
    run::ExecutionPolicy,
};
use stepwise_core::registry::Selection;

use crate::{
    backend::BackendConfig,
    step::{ActionKind, StepDefinition},
};

fn default_true() -> bool {
    true
}

/// The `[run]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Candidate log file locations, most preferred first. `~` and
    /// `$VAR` / `${VAR}` are expanded by the orchestrator.
    #[serde(default)]
    pub log_paths: Vec<String>,

    /// `false` is best-effort mode.
    #[serde(default = "default_true")]
    pub stop_on_required_failure: bool,

    /// Extra attempts after a failed action.
    #[serde(default)]
    pub retries: u32,

    #[serde(default)]
    pub retry_delay_ms: u64,

    /// Step names or tags to leave out.
    #[serde(default)]
    pub skip: Vec<String>,

    /// Step names or tags to restrict the run to. Empty means all.
    #[serde(default)]
    pub only: Vec<String>,

    /// Step names whose precondition is bypassed.
    #[serde(default)]
    pub force: Vec<String>,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            log_paths: Vec::new(),
            stop_on_required_failure: true,
            retries: 0,
            retry_delay_ms: 0,
            skip: Vec::new(),
            only: Vec::new(),
            force: Vec::new(),
        }
    }
}

/// The top-level structure deserialized from a run file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub backend: BackendConfig,

    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<StepDefinition>,

    /// Log candidates from the command line or environment, tried before
    /// `[run] log_paths` or the built-in defaults.
    #[serde(skip)]
    pub log_path_overrides: Vec<String>,
}

impl RunConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `StepwiseError::ConfigError` if the TOML is malformed, does not
    /// match the schema, or fails `validate()`.
    pub fn from_toml_str(s: &str) -> StepwiseResult<Self> {
        let config: RunConfig = toml::from_str(s).map_err(|e| StepwiseError::ConfigError {
            reason: format!("failed to parse run configuration: {}", e),
        })?;
        config.validate()?;
        debug!(steps = config.steps.len(), "run configuration loaded");
        Ok(config)
    }

    /// Read the file at `path` and parse it as a run configuration.
    pub fn from_file(path: &Path) -> StepwiseResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| StepwiseError::ConfigError {
            reason: format!("failed to read run configuration '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check everything that can be checked before a step runs.
    ///
    /// Duplicate step names are left to the registry, which reports them as
    /// `DuplicateStepName`.
    pub fn validate(&self) -> StepwiseResult<()> {
        for step in &self.steps {
            if step.name.trim().is_empty() {
                return Err(config_error("step with an empty name"));
            }
            match &step.action {
                ActionKind::PackageInstall { package } => {
                    non_empty(&step.name, "package", package)?;
                    require_template(&step.name, "package_query", &self.backend.package_query)?;
                    require_template(&step.name, "package_install", &self.backend.package_install)?;
                }
                ActionKind::FeatureToggle { feature } => {
                    non_empty(&step.name, "feature", feature)?;
                    require_template(&step.name, "feature_query", &self.backend.feature_query)?;
                    require_template(&step.name, "feature_enable", &self.backend.feature_enable)?;
                }
                ActionKind::FileWrite { path, .. } => {
                    non_empty(&step.name, "path", path)?;
                }
                ActionKind::RegistryEdit { key, value_name, .. } => {
                    non_empty(&step.name, "key", key)?;
                    non_empty(&step.name, "value_name", value_name)?;
                    require_template(&step.name, "setting_query", &self.backend.setting_query)?;
                    require_template(&step.name, "setting_set", &self.backend.setting_set)?;
                }
                ActionKind::Command { run, check } => {
                    if run.is_empty() {
                        return Err(config_error(format!("step '{}': 'run' is empty", step.name)));
                    }
                    if check.as_ref().is_some_and(|c| c.is_empty()) {
                        return Err(config_error(format!("step '{}': 'check' is empty", step.name)));
                    }
                }
            }
        }
        Ok(())
    }

    /// The execution policy described by `[run]`.
    pub fn policy(&self) -> ExecutionPolicy {
        ExecutionPolicy {
            stop_on_required_failure: self.run.stop_on_required_failure,
            retries: self.run.retries,
            retry_delay: Duration::from_millis(self.run.retry_delay_ms),
            force: self.run.force.iter().cloned().collect::<BTreeSet<_>>(),
            dry_run: false,
        }
    }

    /// The `only` / `skip` selection described by `[run]`.
    pub fn selection(&self) -> Selection {
        Selection {
            only: self.run.only.clone(),
            skip: self.run.skip.clone(),
        }
    }

    /// Override candidates first, then the configured ones, or the built-in
    /// defaults when the run file sets none.
    pub fn log_candidates(&self) -> Vec<String> {
        let configured = if self.run.log_paths.is_empty() {
            default_log_paths()
        } else {
            self.run.log_paths.clone()
        };
        let mut candidates = self.log_path_overrides.clone();
        extend_unique_paths(&mut candidates, configured);
        candidates
    }
}

/// Working-directory log first, then the system temp directory.
pub fn default_log_paths() -> Vec<String> {
    vec![
        "logs/stepwise.log".to_string(),
        std::env::temp_dir()
            .join("stepwise")
            .join("stepwise.log")
            .display()
            .to_string(),
    ]
}

fn extend_unique_paths(target: &mut Vec<String>, extra: Vec<String>) {
    for path in extra {
        if !target.contains(&path) {
            target.push(path);
        }
    }
}

fn require_template(step: &str, template: &str, value: &Option<Vec<String>>) -> StepwiseResult<()> {
    match value {
        Some(argv) if !argv.is_empty() => Ok(()),
        _ => Err(config_error(format!(
            "step '{}' needs [backend] {} to be configured",
            step, template
        ))),
    }
}

fn non_empty(step: &str, field: &str, value: &str) -> StepwiseResult<()> {
    if value.trim().is_empty() {
        Err(config_error(format!("step '{}': '{}' is empty", step, field)))
    } else {
        Ok(())
    }
}

fn config_error(reason: impl Into<String>) -> StepwiseError {
    StepwiseError::ConfigError {
        reason: reason.into(),
    }
}
