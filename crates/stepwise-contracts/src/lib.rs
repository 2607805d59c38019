//! # stepwise-contracts
//!
//! Shared types, outcomes, and the error taxonomy for the stepwise
//! provisioning runner.
//!
//! All crates in the workspace import from here. No orchestration logic
//! lives in this crate: only data definitions and error types.

pub mod error;
pub mod log;
pub mod run;
pub mod step;
