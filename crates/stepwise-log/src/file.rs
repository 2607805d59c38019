//! File-backed log sink with fallback locations.
//!
//! `FileLogSink` pins the first candidate that accepts a test append and
//! writes every later line there. Initialization is fail-fast
//! (`LoggingUnavailable` when no candidate works); writing afterwards is
//! fail-soft (the first failure latches, warns once, and stops file output).

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, warn};

use stepwise_contracts::{
    error::{StepwiseError, StepwiseResult},
    log::LogLevel,
};
use stepwise_core::traits::LogSink;

use crate::{candidates::first_success, console};

/// Render one log file line: `[<RFC 3339 timestamp>] [<LEVEL>] <message>`.
pub fn format_line(timestamp: DateTime<Utc>, level: LogLevel, message: &str) -> String {
    format!(
        "[{}] [{}] {}",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        level,
        message
    )
}

/// Append `line` plus a newline to `path`, creating the file if needed.
///
/// The file is opened and closed per line; there is no handle to release.
fn append_line(path: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()
}

/// Make sure `path`'s directory exists, then prove the file is appendable.
fn probe(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let line = format_line(
        Utc::now(),
        LogLevel::Info,
        &format!("Log opened at {}", path.display()),
    );
    append_line(path, &line)
}

/// An append-only log file sink pinned to one path for the whole run.
#[derive(Debug)]
pub struct FileLogSink {
    active_path: PathBuf,
    write_failed: AtomicBool,
}

impl FileLogSink {
    /// Resolve the active log path from `candidates`, in order.
    ///
    /// For each candidate the parent directory is created if missing and a
    /// header line is appended. The first candidate where both succeed is
    /// pinned. Returns `StepwiseError::LoggingUnavailable` listing every
    /// candidate's error when none works, including when the list is empty.
    pub fn initialize(candidates: &[PathBuf]) -> StepwiseResult<Self> {
        if candidates.is_empty() {
            return Err(StepwiseError::LoggingUnavailable {
                reason: "no log path candidates configured".to_string(),
            });
        }

        let resolved = first_success(candidates.iter(), |path| {
            let result = probe(path);
            if let Err(e) = &result {
                warn!(path = %path.display(), error = %e, "log candidate rejected, trying next");
            }
            result.map(|()| path.to_path_buf())
        });

        match resolved {
            Ok(active_path) => {
                debug!(path = %active_path.display(), "log path pinned");
                Ok(Self {
                    active_path,
                    write_failed: AtomicBool::new(false),
                })
            }
            Err(failures) => {
                let reason = failures
                    .iter()
                    .map(|(path, err)| format!("{}: {}", path.display(), err))
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(StepwiseError::LoggingUnavailable { reason })
            }
        }
    }

    /// True once a write has failed; no file output happens after that.
    pub fn write_failed(&self) -> bool {
        self.write_failed.load(Ordering::SeqCst)
    }

    pub fn path(&self) -> &Path {
        &self.active_path
    }
}

impl LogSink for FileLogSink {
    /// Echo to the console, then append to the pinned file.
    ///
    /// A failed append sets the latch and produces exactly one
    /// `LogWriteFailed` warning for the rest of the run.
    fn log(&self, level: LogLevel, message: &str) {
        console::emit(level, message);

        if self.write_failed.load(Ordering::SeqCst) {
            return;
        }

        let line = format_line(Utc::now(), level, message);
        if let Err(e) = append_line(&self.active_path, &line) {
            if !self.write_failed.swap(true, Ordering::SeqCst) {
                let err = StepwiseError::LogWriteFailed {
                    path: self.active_path.display().to_string(),
                    reason: e.to_string(),
                };
                warn!(target: "stepwise", "{}; continuing with console output only", err);
            }
        }
    }

    fn active_path(&self) -> Option<&Path> {
        Some(&self.active_path)
    }
}
