//! # stepwise-config
//!
//! TOML run configuration for the stepwise provisioning runner.
//!
//! ## Overview
//!
//! A run file has three parts:
//!
//! - `[run]`: failure policy, retries, log candidates, default selection
//! - `[backend]`: argv templates for the package manager, feature toggler,
//!   and settings store collaborators
//! - `[[steps]]`: the ordered step list; order in the file is run order
//!
//! Command-line flags and environment variables are layered on top through
//! [`Overrides`].
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use stepwise_config::RunConfig;
//!
//! let config = RunConfig::from_file(Path::new("devsetup.toml"))?;
//! let policy = config.policy();
//! ```

pub mod backend;
pub mod config;
pub mod overrides;
pub mod step;

pub use backend::{BackendConfig, CommandTemplate};
pub use config::{default_log_paths, RunConfig, RunSection};
pub use overrides::Overrides;
pub use step::{ActionKind, StepDefinition};

// ── Tests ─────────────────────────────────────────────────────────────────────
