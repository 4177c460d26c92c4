use crate::activity::ActivityLog;
use crate::artifact::ArtifactWriter;
use crate::config::RunnerConfig;
use crate::external::{ExecutionResult, ProcessExecutor, TaskExecutor};
use crate::queue::{QueueStore, Task};
use anyhow::{Context, Result};

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub started: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Sequential loop that drains a queue file, one task at a time.
///
/// Each iteration takes the next task off the queue file (rewriting the file
/// without it), logs the start, runs the task and reports the outcome. The
/// loop ends when the queue has no non-blank line left.
///
/// Example
/// ```no_run
/// use queue_runner::{Runner, RunnerConfig};
/// let config = RunnerConfig::new("todo.txt", "done.log");
/// let summary = Runner::from_config(&config).unwrap().run().unwrap();
/// println!("{} tasks started", summary.started);
/// ```
pub struct Runner<E = ProcessExecutor> {
    queue: QueueStore,
    executor: E,
    log: ActivityLog,
    artifacts: ArtifactWriter,
    abort_on_spawn_error: bool,
}

impl Runner<ProcessExecutor> {
    /// Open the activity log and build a process-backed runner.
    pub fn from_config(config: &RunnerConfig) -> Result<Self> {
        let log = ActivityLog::open(&config.log)?;
        let executor = ProcessExecutor::new(config.mode, config.capture);
        Ok(Runner::new(
            QueueStore::new(&config.queue),
            executor,
            log,
            ArtifactWriter::new(&config.artifact_dir),
        )
        .abort_on_spawn_error(config.abort_on_spawn_error))
    }
}

impl<E: TaskExecutor> Runner<E> {
    pub fn new(queue: QueueStore, executor: E, log: ActivityLog, artifacts: ArtifactWriter) -> Self {
        Self {
            queue,
            executor,
            log,
            artifacts,
            abort_on_spawn_error: false,
        }
    }

    pub fn abort_on_spawn_error(mut self, abort: bool) -> Self {
        self.abort_on_spawn_error = abort;
        self
    }

    /// Run until the queue is empty.
    ///
    /// Task failures are recorded and the loop moves on. Queue file I/O errors
    /// (and spawn errors, when configured to abort) end the run with `Err`.
    /// Activity log write errors are reported through `tracing` only.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        while let Some(task) = self.queue.take_next()? {
            summary.started += 1;
            if self.run_task(&task)? {
                summary.completed += 1;
            } else {
                summary.failed += 1;
            }
        }
        tracing::debug!(queue = %self.queue.path().display(), "queue drained");
        Ok(summary)
    }

    /// Execute one task that is already off the queue. Returns whether it succeeded.
    fn run_task(&mut self, task: &Task) -> Result<bool> {
        keep_going(self.log.task_started(task));
        tracing::info!(%task, "task started");

        match self.executor.execute(task) {
            Ok(result) if result.success() => {
                keep_going(self.log.task_completed());
                tracing::info!("task completed");
                Ok(true)
            }
            Ok(result) => {
                self.report_failure(&result);
                Ok(false)
            }
            Err(err) if self.abort_on_spawn_error => {
                Err(err).with_context(|| format!("aborting run, task `{task}` could not be started"))
            }
            Err(err) => {
                let token = self.artifacts.mint_token();
                keep_going(self.log.task_not_started(&err, &token));
                tracing::error!(%token, error = %err, "task could not be started");
                Ok(false)
            }
        }
    }

    fn report_failure(&mut self, result: &ExecutionResult) {
        let token = self.artifacts.mint_token();
        match self.artifacts.write(token, result) {
            Ok(paths) => {
                for path in paths {
                    tracing::debug!(artifact = %path.display(), "saved task output");
                }
            }
            Err(err) => tracing::warn!(%token, error = %format!("{err:#}"), "failed to save task output"),
        }
        keep_going(self.log.task_failed(result.exit_code, &token));
        tracing::error!(%token, exit_code = result.exit_code, "task failed");
    }
}

/// Side outputs (activity log, artifacts) never stop the queue; the task is
/// already off the queue file by the time they are written.
fn keep_going(res: Result<()>) {
    if let Err(err) = res {
        tracing::warn!(error = %format!("{err:#}"), "failed to record activity");
    }
}
