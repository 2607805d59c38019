//! Error taxonomy for the stepwise provisioning runner.
//!
//! Only `LoggingUnavailable`, `DuplicateStepName` and `ConfigError` may abort
//! the process, and only before the first step runs. Everything raised while
//! steps execute is captured into a `StepOutcome` instead.

use thiserror::Error;

/// The unified error type for the stepwise crates.
#[derive(Debug, Error)]
pub enum StepwiseError {
    /// No candidate log location accepted a test write.
    ///
    /// Fatal at startup: a run without an on-disk audit trail is not started.
    #[error("logging unavailable: {reason}")]
    LoggingUnavailable { reason: String },

    /// Two steps were registered under the same name.
    #[error("duplicate step name '{name}'")]
    DuplicateStepName { name: String },

    /// A step's action failed; wraps the underlying collaborator or I/O error.
    ///
    /// Never propagated past the executor; downgraded to `Warned` or `Failed`.
    #[error("step '{step}' failed: {reason}")]
    StepActionFailed { step: String, reason: String },

    /// Appending to the active log file failed after initialization.
    ///
    /// Latched by the sink and surfaced once as a console warning.
    #[error("log write to '{path}' failed: {reason}")]
    LogWriteFailed { path: String, reason: String },

    /// A configuration value is missing, malformed, or names an unknown step.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// An external collaborator (package manager, feature toggler, settings
    /// store) could not be queried or invoked.
    #[error("{operation} failed: {reason}")]
    CollaboratorFailed { operation: String, reason: String },
}

impl StepwiseError {
    /// Shorthand for building a `StepActionFailed` from any displayable reason.
    pub fn step_failed(step: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::StepActionFailed {
            step: step.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used throughout the stepwise crates.
pub type StepwiseResult<T> = Result<T, StepwiseError>;
