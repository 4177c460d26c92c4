use crate::command::{ExitCode, InvocationMode};
use crate::queue::Task;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

/// Outcome of one executed task.
///
/// The streams are `None` when output capture is disabled; the child then
/// writes straight to the runner's own stdout and stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: ExitCode,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A task that could not be turned into a running process.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("task produced an empty command")]
    EmptyCommand,
    #[error("command not found: {0}")]
    NotFound(String),
    #[error("failed to run {program}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Runs one task to completion.
///
/// A non-zero exit is a normal [`ExecutionResult`], not an error. `Err` is
/// reserved for tasks that never started.
pub trait TaskExecutor {
    fn execute(&mut self, task: &Task) -> Result<ExecutionResult, SpawnError>;
}

/// Executes tasks as child processes and blocks until each one exits.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    mode: InvocationMode,
    capture: bool,
    search_paths: Option<OsString>,
}

impl ProcessExecutor {
    pub fn new(mode: InvocationMode, capture: bool) -> Self {
        Self {
            mode,
            capture,
            search_paths: None,
        }
    }

    /// Use `paths` instead of the process `PATH` when resolving programs.
    pub fn with_search_paths(mut self, paths: impl Into<OsString>) -> Self {
        self.search_paths = Some(paths.into());
        self
    }

    fn resolve_program(&self, program: &OsStr) -> Result<PathBuf, SpawnError> {
        let search_paths = self
            .search_paths
            .clone()
            .or_else(|| std::env::var_os("PATH"))
            .unwrap_or_default();
        match find_command_path(&search_paths, Path::new(program)) {
            Some(path) => Ok(path.into_owned()),
            // Elsewhere the OS also tries executable extensions, let it decide.
            None if cfg!(not(unix)) => Ok(PathBuf::from(program)),
            None => Err(SpawnError::NotFound(program.to_string_lossy().into_owned())),
        }
    }
}

impl TaskExecutor for ProcessExecutor {
    fn execute(&mut self, task: &Task) -> Result<ExecutionResult, SpawnError> {
        let argv = self.mode.argv(task.as_str());
        let (program, args) = argv.split_first().ok_or(SpawnError::EmptyCommand)?;
        let executable = self.resolve_program(program)?;
        tracing::debug!(program = %executable.display(), ?args, capture = self.capture, "spawning task");

        let io_error = |source: io::Error| SpawnError::Io {
            program: program.to_string_lossy().into_owned(),
            source,
        };
        let mut cmd = Command::new(&executable);
        cmd.args(args).stdin(Stdio::inherit());

        if self.capture {
            let output = cmd
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .map_err(io_error)?;
            Ok(ExecutionResult {
                exit_code: exit_code(output.status),
                stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
                stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            })
        } else {
            let status = cmd
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(io_error)?;
            Ok(ExecutionResult {
                exit_code: exit_code(status),
                stdout: None,
                stderr: None,
            })
        }
    }
}

fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a task's program against `search_paths` (the process `PATH` or the
/// executor's configured list).
///
/// - Absolute path, `./tool` or `bin/tool`: returned if it names an executable file.
/// - Bare name: the first executable `name` found in `search_paths`. Files
///   without an execute bit are skipped, as `execvp` does.
/// - Empty path: `None`.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && is_executable(path) {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|path| is_executable(path))
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if is_executable(path) { Some(path) } else { None }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
