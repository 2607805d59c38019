//! One precondition and one executor function per `ActionKind`.
//!
//! `check()` and `apply()` dispatch by pattern match; each kind's functions
//! only talk to the collaborator that kind needs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use stepwise_config::{ActionKind, BackendConfig};
use stepwise_contracts::{
    error::{StepwiseError, StepwiseResult},
    step::Precondition,
};
use stepwise_core::traits::{FeatureToggler, PackageManager, SettingsStore};
use stepwise_log::candidates;

use crate::backend::{run_argv, run_checked, CommandBackend};

/// The external collaborators configured steps call into.
#[derive(Clone)]
pub struct Collaborators {
    pub packages: Arc<dyn PackageManager>,
    pub features: Arc<dyn FeatureToggler>,
    pub settings: Arc<dyn SettingsStore>,
}

impl Collaborators {
    /// Serve all three roles from one `CommandBackend`.
    pub fn from_backend(config: &BackendConfig) -> Self {
        let backend = Arc::new(CommandBackend::new(config.clone()));
        Self {
            packages: backend.clone(),
            features: backend.clone(),
            settings: backend,
        }
    }
}

fn satisfied_if(present: bool) -> Precondition {
    if present {
        Precondition::AlreadySatisfied
    } else {
        Precondition::NeedsAction
    }
}

/// Side-effect-free idempotency check for `kind`.
pub fn check(kind: &ActionKind, collaborators: &Collaborators) -> StepwiseResult<Precondition> {
    match kind {
        ActionKind::PackageInstall { package } => check_package(collaborators.packages.as_ref(), package),
        ActionKind::FeatureToggle { feature } => check_feature(collaborators.features.as_ref(), feature),
        ActionKind::FileWrite { path, contents } => check_file(&resolve_path(path)?, contents),
        ActionKind::RegistryEdit { key, value_name, value } => {
            check_setting(collaborators.settings.as_ref(), key, value_name, value)
        }
        ActionKind::Command { check, .. } => check_command(check.as_deref()),
    }
}

/// Perform the side effect for `kind`.
pub fn apply(kind: &ActionKind, collaborators: &Collaborators) -> StepwiseResult<()> {
    match kind {
        ActionKind::PackageInstall { package } => collaborators.packages.install(package),
        ActionKind::FeatureToggle { feature } => collaborators.features.enable(feature),
        ActionKind::FileWrite { path, contents } => write_file(&resolve_path(path)?, contents),
        ActionKind::RegistryEdit { key, value_name, value } => {
            collaborators.settings.write(key, value_name, value)
        }
        ActionKind::Command { run, .. } => run_checked("command", run).map(|_| ()),
    }
}

// ── Package install ───────────────────────────────────────────────────────────

fn check_package(packages: &dyn PackageManager, package: &str) -> StepwiseResult<Precondition> {
    packages.is_installed(package).map(satisfied_if)
}

// ── Feature toggle ────────────────────────────────────────────────────────────

fn check_feature(features: &dyn FeatureToggler, feature: &str) -> StepwiseResult<Precondition> {
    features.is_enabled(feature).map(satisfied_if)
}

// ── File write ────────────────────────────────────────────────────────────────

fn resolve_path(raw: &str) -> StepwiseResult<PathBuf> {
    candidates::expand(raw).map_err(|reason| StepwiseError::ConfigError { reason })
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Satisfied when the file exists with exactly the desired contents.
fn check_file(path: &Path, contents: &str) -> StepwiseResult<Precondition> {
    match fs::read(path) {
        Ok(existing) => {
            let current = digest(&existing);
            let desired = digest(contents.as_bytes());
            debug!(path = %path.display(), %current, %desired, "comparing file digests");
            Ok(satisfied_if(current == desired))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Precondition::NeedsAction),
        Err(e) => Err(StepwiseError::CollaboratorFailed {
            operation: "file read".to_string(),
            reason: format!("{}: {}", path.display(), e),
        }),
    }
}

fn write_file(path: &Path, contents: &str) -> StepwiseResult<()> {
    let io_err = |e: std::io::Error| StepwiseError::CollaboratorFailed {
        operation: "file write".to_string(),
        reason: format!("{}: {}", path.display(), e),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}

// ── Registry edit ─────────────────────────────────────────────────────────────

fn check_setting(
    settings: &dyn SettingsStore,
    key: &str,
    value_name: &str,
    value: &str,
) -> StepwiseResult<Precondition> {
    let current = settings.read(key, value_name)?;
    Ok(satisfied_if(current.as_deref() == Some(value)))
}

// ── Command ───────────────────────────────────────────────────────────────────

/// Without a `check` argv a command step always runs.
fn check_command(check: Option<&[String]>) -> StepwiseResult<Precondition> {
    match check {
        Some(argv) => run_argv("command check", argv).map(|out| satisfied_if(out.status.success())),
        None => Ok(Precondition::NeedsAction),
    }
}
