//! Core trait definitions for the stepwise provisioning pipeline.
//!
//! - `Step`           : one idempotent provisioning unit (check, then apply)
//! - `LogSink`        : where progress lines go; never fails the run
//! - `PackageManager`, `FeatureToggler`, `SettingsStore`
//!                    : external collaborators steps call into
//!
//! The executor owns ordering and failure policy. Steps own only their own
//! idempotency check and side effect.

use std::path::Path;

use stepwise_contracts::{
    error::StepwiseResult,
    log::LogLevel,
    run::RunId,
    step::Precondition,
};

/// Everything a step invocation receives from the executor.
///
/// The sink is passed explicitly rather than reached through global state.
pub struct StepContext<'a> {
    pub run_id: &'a RunId,
    pub sink: &'a dyn LogSink,
}

/// A named, idempotent provisioning step.
///
/// Steps are registered once and never mutated. The executor guarantees
/// `apply()` is not called when `check()` reports `AlreadySatisfied`, unless
/// the step is forced by the run policy.
pub trait Step: Send + Sync {
    /// Unique identifier within a registry.
    fn name(&self) -> &str;

    /// One-line human description for plans and logs.
    fn description(&self) -> &str {
        ""
    }

    /// If true, a failure is fatal to the run under the default policy.
    fn required(&self) -> bool;

    /// Labels used by `--only` / `--skip` selection.
    fn tags(&self) -> &[String] {
        &[]
    }

    /// Side-effect-free idempotency check.
    fn check(&self, ctx: &StepContext<'_>) -> StepwiseResult<Precondition>;

    /// Perform the side effect.
    fn apply(&self, ctx: &StepContext<'_>) -> StepwiseResult<()>;
}

/// A best-effort, append-only log destination.
///
/// `log()` has no failure path: implementations swallow their own write
/// errors so logging can never abort provisioning once a run is underway.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    /// The file this sink writes to, if it writes to one.
    fn active_path(&self) -> Option<&Path> {
        None
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.log(LogLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// A package manager capability (Chocolatey, winget, apt, ...).
pub trait PackageManager: Send + Sync {
    fn is_installed(&self, package: &str) -> StepwiseResult<bool>;
    fn install(&self, package: &str) -> StepwiseResult<()>;
}

/// An OS feature toggler (Windows optional features, systemd units, ...).
pub trait FeatureToggler: Send + Sync {
    fn is_enabled(&self, feature: &str) -> StepwiseResult<bool>;
    fn enable(&self, feature: &str) -> StepwiseResult<()>;
}

/// A hierarchical key/value settings store (the Windows registry, dconf, ...).
pub trait SettingsStore: Send + Sync {
    /// Current value of `name` under `key`, or `None` when it is unset.
    fn read(&self, key: &str, name: &str) -> StepwiseResult<Option<String>>;
    fn write(&self, key: &str, name: &str, value: &str) -> StepwiseResult<()>;
}
