//! Output files for failed tasks, keyed by a correlation token.

use crate::external::ExecutionResult;
use anyhow::{Context, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier minted when a task fails, shared by its log entry and artifact files.
///
/// Rendered as lowercase hex of nanoseconds since the Unix epoch, e.g. `0x1862d5a3f0c4e200`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CorrelationToken(u128);

impl CorrelationToken {
    pub fn from_nanos(nanos: u128) -> Self {
        Self(nanos)
    }
}

impl fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Mints correlation tokens and writes captured streams of failed tasks.
#[derive(Debug)]
pub struct ArtifactWriter {
    dir: PathBuf,
    last: Option<CorrelationToken>,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A new token from the wall clock, strictly greater than any token this
    /// writer issued before.
    pub fn mint_token(&mut self) -> CorrelationToken {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let token = match self.last {
            Some(last) if nanos <= last.0 => CorrelationToken(last.0 + 1),
            _ => CorrelationToken(nanos),
        };
        self.last = Some(token);
        token
    }

    /// Write each non-empty captured stream of `result` to its own file.
    ///
    /// Returns the paths written; absent or empty streams produce no file.
    pub fn write(&self, token: CorrelationToken, result: &ExecutionResult) -> Result<Vec<PathBuf>> {
        let streams = [("stdout", &result.stdout), ("stderr", &result.stderr)];
        let mut written = Vec::new();
        for (stream, content) in streams {
            let Some(content) = content.as_deref().filter(|c| !c.is_empty()) else {
                continue;
            };
            let path = self.dir.join(format!("{stream}_{token}.txt"));
            // create_new: an artifact is never overwritten.
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .with_context(|| format!("failed to create artifact {}", path.display()))?;
            file.write_all(content.as_bytes())
                .with_context(|| format!("failed to write artifact {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }
}
