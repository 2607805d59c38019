//! The console leg shared by every sink.
//!
//! Lines go through `tracing` so the subscriber installed by the binary
//! decides colouring and filtering. Emitting an event cannot fail.

use tracing::{debug, error, info, warn};

use stepwise_contracts::log::LogLevel;

pub fn emit(level: LogLevel, message: &str) {
    match level {
        LogLevel::Debug => debug!(target: "stepwise", "{}", message),
        LogLevel::Info => info!(target: "stepwise", "{}", message),
        LogLevel::Success => info!(target: "stepwise", success = true, "{}", message),
        LogLevel::Warning => warn!(target: "stepwise", "{}", message),
        LogLevel::Error => error!(target: "stepwise", "{}", message),
    }
}
