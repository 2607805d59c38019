//! In-memory implementation of `LogSink`.
//!
//! `MemoryLogSink` keeps every entry in a `Vec` behind `Arc<Mutex<_>>`.
//! It backs `plan` runs, where nothing should touch the disk, and tests that
//! need to inspect what was logged.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use stepwise_contracts::log::LogLevel;
use stepwise_core::traits::LogSink;

use crate::console;

/// One recorded log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

/// A log sink that records entries in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    echo: bool,
}

impl MemoryLogSink {
    /// A silent sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that also forwards every line to the console.
    pub fn echoing() -> Self {
        Self {
            entries: Arc::default(),
            echo: true,
        }
    }

    /// Snapshot of all entries recorded so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().expect("log entries lock poisoned").clone()
    }

    /// Messages at `level`, in order.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .expect("log entries lock poisoned")
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, level: LogLevel, message: &str) {
        if self.echo {
            console::emit(level, message);
        }
        // A poisoned lock means a panic elsewhere already; dropping the line
        // keeps `log()` infallible.
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                timestamp: Utc::now(),
                level,
                message: message.to_string(),
            });
        }
    }
}
