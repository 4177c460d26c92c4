//! A durable FIFO task runner driven by an editable queue file.
//!
//! Each line of the queue file is a command. The runner takes the first
//! non-blank line, rewrites the file without it, and only then runs the
//! command as a child process. Because the file is touched only between
//! executions, anyone can append, reorder or delete *future* tasks while the
//! current one is still running.
//!
//! The main entry point is [`Runner`], configured through [`RunnerConfig`]. The
//! public modules expose the building blocks: [`queue`] for the queue file,
//! [`external`] for process execution, [`activity`] for the activity log and
//! [`artifact`] for the output files written when a task fails.
//!
//! Known limitation: nothing locks the queue file. An edit that lands between
//! the runner reading the file and writing it back is silently lost. Run one
//! runner per queue file.

pub mod activity;
pub mod artifact;
pub mod command;
pub mod config;
pub mod external;
pub mod queue;
mod runner;

pub use config::RunnerConfig;
pub use runner::{RunSummary, Runner};
