//! # stepwise-log
//!
//! Append-only log sinks for the stepwise provisioning runner.
//!
//! ## Overview
//!
//! [`FileLogSink`] resolves its location once, from an ordered list of
//! candidate paths (first writable wins), and appends one
//! `[timestamp] [LEVEL] message` line per event. Every line is echoed to the
//! console through `tracing`. After initialization a write failure is
//! latched and reported once; it never reaches the caller.
//!
//! [`MemoryLogSink`] records entries in memory for dry runs and tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stepwise_log::{candidates, FileLogSink};
//!
//! let paths = vec![candidates::expand("~/.stepwise/setup.log")?];
//! let sink = FileLogSink::initialize(&paths)?;
//! let report = executor.run(&steps, &sink);
//! ```

pub mod candidates;
pub mod console;
pub mod file;
pub mod memory;

pub use file::FileLogSink;
pub use memory::{LogEntry, MemoryLogSink};

// ── Tests ─────────────────────────────────────────────────────────────────────
