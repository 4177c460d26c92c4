//! The queue file: an ordered list of pending tasks, one per line.
//!
//! The file is the single source of truth for work that has not started yet.
//! [`QueueStore::take_next`] performs one read-modify-write cycle: it loads the
//! file, pops the first non-blank line and writes the remainder back before
//! returning the task. The currently executing task is therefore never on
//! disk, and a crash mid-task loses that task instead of running it twice.

use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single trimmed, non-empty command line taken from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task(String);

impl Task {
    /// Build a task from a raw line. Returns `None` for blank lines.
    pub fn from_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Task(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fatal storage failures. The runner never retries these.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("failed to read queue file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write queue file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Raw lines of the queue file, line terminators included.
pub type QueueLines = VecDeque<String>;

/// File-backed queue of pending task lines.
#[derive(Debug, Clone)]
pub struct QueueStore {
    path: PathBuf,
}

impl QueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole queue file as an ordered sequence of raw lines.
    ///
    /// Line terminators are kept so that [`QueueStore::persist`] writes the
    /// untouched lines back byte for byte.
    pub fn load(&self) -> Result<QueueLines, QueueError> {
        let content = fs::read_to_string(&self.path).map_err(|source| QueueError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(content.split_inclusive('\n').map(str::to_owned).collect())
    }

    /// Pop lines from the front of `lines` until a non-blank one is found.
    ///
    /// Blank lines are consumed silently. Returns `None` once `lines` is
    /// exhausted. Only the in-memory sequence is modified.
    pub fn dequeue_next(lines: &mut QueueLines) -> Option<Task> {
        while let Some(line) = lines.pop_front() {
            if let Some(task) = Task::from_line(&line) {
                return Some(task);
            }
            tracing::debug!("skipping blank queue line");
        }
        None
    }

    /// Overwrite the queue file with `remaining`, verbatim.
    pub fn persist(&self, remaining: &QueueLines) -> Result<(), QueueError> {
        let content: String = remaining.iter().map(String::as_str).collect();
        fs::write(&self.path, content).map_err(|source| QueueError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// One logical queue step: load, dequeue the next task, persist the rest.
    ///
    /// The file is rewritten even when no task is found, which drops any
    /// trailing blank lines. Edits made by other writers between `load` and
    /// `persist` are overwritten.
    pub fn take_next(&self) -> Result<Option<Task>, QueueError> {
        let mut lines = self.load()?;
        let task = Self::dequeue_next(&mut lines);
        self.persist(&lines)?;
        tracing::debug!(
            queue = %self.path.display(),
            remaining = lines.len(),
            "queue file rewritten"
        );
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn queue_with(content: &str) -> (TempDir, QueueStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("queue.txt");
        fs::write(&path, content).expect("write queue");
        (dir, QueueStore::new(path))
    }

    #[test]
    fn task_from_line_trims_and_rejects_blank() {
        assert_eq!(
            Task::from_line("  echo hi \n").map(|t| t.to_string()),
            Some("echo hi".to_string())
        );
        assert_eq!(Task::from_line(" \t\r\n"), None);
        assert_eq!(Task::from_line(""), None);
    }

    #[test]
    fn load_keeps_line_terminators() {
        let (_dir, store) = queue_with("a\n\nb");
        let lines = store.load().unwrap();
        assert_eq!(lines, VecDeque::from(vec!["a\n".to_string(), "\n".to_string(), "b".to_string()]));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = QueueStore::new(dir.path().join("missing.txt"));
        assert!(matches!(store.load(), Err(QueueError::Read { .. })));
    }

    #[test]
    fn dequeue_skips_leading_blank_lines() {
        let mut lines: QueueLines = ["\n", "   \n", "echo a\n", "echo b\n"]
            .into_iter()
            .map(String::from)
            .collect();
        let task = QueueStore::dequeue_next(&mut lines);
        assert_eq!(task.map(|t| t.to_string()), Some("echo a".to_string()));
        assert_eq!(lines, VecDeque::from(vec!["echo b\n".to_string()]));
    }

    #[test]
    fn dequeue_all_blank_exhausts_sequence() {
        let mut lines: QueueLines = ["\n", " \n"].into_iter().map(String::from).collect();
        assert_eq!(QueueStore::dequeue_next(&mut lines), None);
        assert!(lines.is_empty());
    }

    #[test]
    fn take_next_removes_task_from_file_before_returning() {
        let (_dir, store) = queue_with("echo hello\n\necho world\n");

        let first = store.take_next().unwrap();
        assert_eq!(first.map(|t| t.to_string()), Some("echo hello".to_string()));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "\necho world\n");

        let second = store.take_next().unwrap();
        assert_eq!(second.map(|t| t.to_string()), Some("echo world".to_string()));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "");

        assert_eq!(store.take_next().unwrap(), None);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "");
    }

    #[test]
    fn persist_writes_remaining_lines_verbatim() {
        let (_dir, store) = queue_with("");
        let remaining: QueueLines = ["  indented \n", "last-no-newline"]
            .into_iter()
            .map(String::from)
            .collect();
        store.persist(&remaining).unwrap();
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "  indented \nlast-no-newline"
        );
    }

    #[test]
    fn persist_into_missing_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = QueueStore::new(dir.path().join("nope").join("queue.txt"));
        let err = store.persist(&QueueLines::new()).unwrap_err();
        assert!(matches!(err, QueueError::Write { .. }));
    }
}
