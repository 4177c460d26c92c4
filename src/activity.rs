//! Append-only activity log.
//!
//! Every line has the form `[<timestamp>][<LEVEL>] - <message>`. The log is
//! opened once per run and handed to the runner; it is never truncated, so
//! successive runs keep appending to the same file.

use crate::artifact::CorrelationToken;
use crate::command::ExitCode;
use crate::external::SpawnError;
use crate::queue::Task;
use anyhow::{Context, Result};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => f.write_str("INFO"),
            Level::Error => f.write_str("ERROR"),
        }
    }
}

pub struct ActivityLog {
    out: Box<dyn Write>,
}

impl ActivityLog {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open activity log {}", path.display()))?;
        Ok(Self::from_writer(file))
    }

    pub fn from_writer(out: impl Write + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    /// Append one entry and flush it.
    pub fn record(&mut self, level: Level, message: impl fmt::Display) -> Result<()> {
        let now = chrono::Local::now();
        writeln!(
            self.out,
            "[{}][{}] - {}",
            now.format(TIMESTAMP_FORMAT),
            level,
            message
        )
        .and_then(|()| self.out.flush())
        .context("failed to write activity log")
    }

    pub fn task_started(&mut self, task: &Task) -> Result<()> {
        self.record(Level::Info, format_args!("task started: {task}"))
    }

    pub fn task_completed(&mut self) -> Result<()> {
        self.record(Level::Info, "task completed")
    }

    pub fn task_failed(&mut self, exit_code: ExitCode, token: &CorrelationToken) -> Result<()> {
        self.record(
            Level::Error,
            format_args!("task failed, exit code {exit_code}, correlation {token}"),
        )
    }

    pub fn task_not_started(&mut self, error: &SpawnError, token: &CorrelationToken) -> Result<()> {
        self.record(
            Level::Error,
            format_args!("task could not be started: {error}, correlation {token}"),
        )
    }
}
