//! `CommandBackend`: collaborators driven by configured argv templates.
//!
//! One backend serves as package manager, feature toggler, and settings
//! store. Each operation renders its template (`{name}`, `{feature}`,
//! `{key}`, `{value_name}`, `{value}`), runs it without a shell, and reads
//! the exit status. A query exiting 0 means "present"; a setting query's
//! trimmed stdout is the current value.

use std::process::{Command, Output, Stdio};

use tracing::debug;

use stepwise_config::{BackendConfig, CommandTemplate};
use stepwise_contracts::error::{StepwiseError, StepwiseResult};
use stepwise_core::traits::{FeatureToggler, PackageManager, SettingsStore};

/// Substitute `{placeholder}` occurrences in every argv element.
///
/// Each element is scanned once, so substituted values are never expanded
/// again. Unknown placeholders are left as written.
pub fn render(template: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    template.iter().map(|arg| render_arg(arg, vars)).collect()
}

fn render_arg(arg: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let known = after.find('}').and_then(|end| {
            let name = &after[..end];
            vars.iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| (end, *value))
        });
        match known {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Run `argv` to completion, capturing stdout and stderr.
pub fn run_argv(operation: &str, argv: &[String]) -> StepwiseResult<Output> {
    let (program, args) = argv.split_first().ok_or_else(|| StepwiseError::CollaboratorFailed {
        operation: operation.to_string(),
        reason: "command is empty".to_string(),
    })?;

    debug!(operation, command = %argv.join(" "), "running collaborator command");
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| StepwiseError::CollaboratorFailed {
            operation: operation.to_string(),
            reason: format!("could not run '{}': {}", program, e),
        })
}

/// Run `argv` and turn a non-zero exit into `CollaboratorFailed`.
pub fn run_checked(operation: &str, argv: &[String]) -> StepwiseResult<Output> {
    let output = run_argv(operation, argv)?;
    if output.status.success() {
        Ok(output)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() { stdout } else { stderr };
        Err(StepwiseError::CollaboratorFailed {
            operation: operation.to_string(),
            reason: format!("{}: {}", output.status, detail.trim()),
        })
    }
}

/// Package, feature, and settings collaborators backed by external commands.
#[derive(Debug, Clone, Default)]
pub struct CommandBackend {
    config: BackendConfig,
}

impl CommandBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    fn template<'a>(
        &self,
        operation: &str,
        template: &'a Option<CommandTemplate>,
    ) -> StepwiseResult<&'a CommandTemplate> {
        template
            .as_ref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| StepwiseError::CollaboratorFailed {
                operation: operation.to_string(),
                reason: "no command template configured".to_string(),
            })
    }
}

impl PackageManager for CommandBackend {
    fn is_installed(&self, package: &str) -> StepwiseResult<bool> {
        let template = self.template("package query", &self.config.package_query)?;
        let output = run_argv("package query", &render(template, &[("name", package)]))?;
        Ok(output.status.success())
    }

    fn install(&self, package: &str) -> StepwiseResult<()> {
        let template = self.template("package install", &self.config.package_install)?;
        run_checked("package install", &render(template, &[("name", package)])).map(|_| ())
    }
}

impl FeatureToggler for CommandBackend {
    fn is_enabled(&self, feature: &str) -> StepwiseResult<bool> {
        let template = self.template("feature query", &self.config.feature_query)?;
        let output = run_argv("feature query", &render(template, &[("feature", feature)]))?;
        Ok(output.status.success())
    }

    fn enable(&self, feature: &str) -> StepwiseResult<()> {
        let template = self.template("feature enable", &self.config.feature_enable)?;
        run_checked("feature enable", &render(template, &[("feature", feature)])).map(|_| ())
    }
}

impl SettingsStore for CommandBackend {
    fn read(&self, key: &str, name: &str) -> StepwiseResult<Option<String>> {
        let template = self.template("setting query", &self.config.setting_query)?;
        let argv = render(template, &[("key", key), ("value_name", name)]);
        let output = run_argv("setting query", &argv)?;
        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
        } else {
            Ok(None)
        }
    }

    fn write(&self, key: &str, name: &str, value: &str) -> StepwiseResult<()> {
        let template = self.template("setting write", &self.config.setting_set)?;
        let argv = render(template, &[("key", key), ("value_name", name), ("value", value)]);
        run_checked("setting write", &argv).map(|_| ())
    }
}
