use crate::command::InvocationMode;
use argh::FromArgs;
use std::path::PathBuf;

/// Settings for one runner instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Queue file; must exist before the run starts.
    pub queue: PathBuf,
    /// Activity log, appended to.
    pub log: PathBuf,
    /// How each task line becomes a process invocation.
    pub mode: InvocationMode,
    /// Capture child output so failures leave artifact files behind.
    ///
    /// Off by default: the child inherits the runner's streams and no
    /// artifact is ever written.
    pub capture: bool,
    /// Directory receiving `stdout_<token>.txt` / `stderr_<token>.txt`.
    pub artifact_dir: PathBuf,
    /// Abort the run when a task cannot be spawned instead of logging it as a failure.
    pub abort_on_spawn_error: bool,
}

impl RunnerConfig {
    pub fn new(queue: impl Into<PathBuf>, log: impl Into<PathBuf>) -> Self {
        Self {
            queue: queue.into(),
            log: log.into(),
            mode: InvocationMode::default(),
            capture: false,
            artifact_dir: PathBuf::from("."),
            abort_on_spawn_error: false,
        }
    }
}

#[derive(FromArgs, Debug)]
/// Execute the commands of a queue file one at a time, removing each line
/// before it runs. The file may be edited while a task is running.
pub struct Args {
    #[argh(option, short = 'q')]
    /// queue file to consume, one command per line
    pub queue: PathBuf,

    #[argh(option, short = 'l')]
    /// activity log file, appended to
    pub log: PathBuf,

    #[argh(option, default = "InvocationMode::Whitespace")]
    /// how a line becomes a process: `whitespace` (split on whitespace, default) or `shell` (run through sh -c)
    pub mode: InvocationMode,

    #[argh(switch)]
    /// capture task stdout/stderr and save them as artifacts when a task fails
    pub capture: bool,

    #[argh(option, default = "PathBuf::from(\".\")")]
    /// directory for stdout_<token>.txt / stderr_<token>.txt artifacts (default: current directory)
    pub artifact_dir: PathBuf,

    #[argh(switch)]
    /// stop the whole run when a task's program cannot be started
    pub abort_on_spawn_error: bool,
}

impl From<Args> for RunnerConfig {
    fn from(args: Args) -> Self {
        Self {
            queue: args.queue,
            log: args.log,
            mode: args.mode,
            capture: args.capture,
            artifact_dir: args.artifact_dir,
            abort_on_spawn_error: args.abort_on_spawn_error,
        }
    }
}
