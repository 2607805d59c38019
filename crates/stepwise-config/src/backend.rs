//! Command templates for the external collaborators.
//!
//! Each template is an argv whose elements may contain placeholders that are
//! substituted before the command runs:
//!
//! | Template | Placeholders |
//! |----------|--------------|
//! | `package_query`, `package_install` | `{name}` |
//! | `feature_query`, `feature_enable` | `{feature}` |
//! | `setting_query` | `{key}`, `{value_name}` |
//! | `setting_set` | `{key}`, `{value_name}`, `{value}` |
//!
//! Example in TOML:
//! ```toml
//! [backend]
//! package_query = ["choco", "list", "--local-only", "--exact", "{name}"]
//! package_install = ["choco", "install", "-y", "{name}"]
//! ```

use serde::{Deserialize, Serialize};

/// An argv with `{placeholder}` substitutions.
pub type CommandTemplate = Vec<String>;

/// The `[backend]` table. Every template is optional; a step whose kind needs
/// a missing template is rejected when the configuration is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    pub package_query: Option<CommandTemplate>,
    pub package_install: Option<CommandTemplate>,
    pub feature_query: Option<CommandTemplate>,
    pub feature_enable: Option<CommandTemplate>,
    pub setting_query: Option<CommandTemplate>,
    pub setting_set: Option<CommandTemplate>,
}
