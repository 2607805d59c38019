//! # stepwise-core
//!
//! The sequential, failure-isolating provisioning runtime.
//!
//! This crate provides:
//! - The step and collaborator traits (`Step`, `LogSink`, `PackageManager`,
//!   `FeatureToggler`, `SettingsStore`)
//! - The ordered `StepRegistry` and `Selection`
//! - The `Executor` that runs selected steps and builds the `RunReport`
//! - Report finalization and the console summary table
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stepwise_core::{Executor, StepRegistry, registry::Selection};
//!
//! let steps = Selection::default().select(&registry);
//! let report = Executor::default().run(&steps, &sink);
//! std::process::exit(report.exit_code());
//! ```

pub mod executor;
pub mod registry;
pub mod report;
pub mod traits;

pub use executor::Executor;
pub use registry::StepRegistry;
