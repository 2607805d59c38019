//! Step definitions as they appear in the run file.
//!
//! Each `[[steps]]` table names the step, its failure policy, and a `kind`
//! that selects the action. Steps run in the order they are declared.
//!
//! Example in TOML:
//! ```toml
//! [[steps]]
//! name = "install-git"
//! description = "Git for Windows"
//! tags = ["git"]
//! kind = "package-install"
//! package = "git"
//! unless_command = "git"
//! ```

use serde::{Deserialize, Serialize};

/// The side effect a configured step performs.
///
/// Expressed in TOML through the `kind` key (kebab-case) plus the variant's
/// own fields, flattened into the step table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActionKind {
    /// Install a package through the configured package manager.
    PackageInstall { package: String },

    /// Enable an OS feature through the configured feature toggler.
    FeatureToggle { feature: String },

    /// Write `contents` to `path`, creating parent directories.
    FileWrite { path: String, contents: String },

    /// Set `value_name` under `key` in the configured settings store.
    RegistryEdit {
        key: String,
        value_name: String,
        value: String,
    },

    /// Run an arbitrary argv. `check`, when present, is satisfied on exit 0.
    Command {
        run: Vec<String>,
        #[serde(default)]
        check: Option<Vec<String>>,
    },
}

impl ActionKind {
    /// The `kind` string used in TOML, for plans and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::PackageInstall { .. } => "package-install",
            ActionKind::FeatureToggle { .. } => "feature-toggle",
            ActionKind::FileWrite { .. } => "file-write",
            ActionKind::RegistryEdit { .. } => "registry-edit",
            ActionKind::Command { .. } => "command",
        }
    }

    /// Short description of what the action targets.
    pub fn target(&self) -> String {
        match self {
            ActionKind::PackageInstall { package } => package.clone(),
            ActionKind::FeatureToggle { feature } => feature.clone(),
            ActionKind::FileWrite { path, .. } => path.clone(),
            ActionKind::RegistryEdit { key, value_name, .. } => format!("{}\\{}", key, value_name),
            ActionKind::Command { run, .. } => run.join(" "),
        }
    }
}

fn default_required() -> bool {
    true
}

/// A single `[[steps]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Unique step name, used by `--only`, `--skip`, `--force` and the report.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Failure of a required step aborts the run under the default policy.
    /// Defaults to `true`.
    #[serde(default = "default_required")]
    pub required: bool,

    #[serde(default)]
    pub tags: Vec<String>,

    /// If this program is on `PATH`, the step is already satisfied.
    #[serde(default)]
    pub unless_command: Option<String>,

    #[serde(flatten)]
    pub action: ActionKind,
}
