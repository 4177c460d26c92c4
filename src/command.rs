use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// How a task line is turned into a process invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvocationMode {
    /// Split the line on whitespace and run the first word directly.
    ///
    /// No quoting, escaping or shell operators: `echo "a b"` runs `echo` with
    /// the two arguments `"a` and `b"`.
    #[default]
    Whitespace,
    /// Hand the whole line to the platform shell (`sh -c` / `cmd /C`).
    Shell,
}

impl InvocationMode {
    /// Build the argument vector for `task`. The first element is the program.
    ///
    /// Returns an empty vector when the whitespace split yields no words.
    pub fn argv(self, task: &str) -> Vec<OsString> {
        match self {
            InvocationMode::Whitespace => task.split_whitespace().map(OsString::from).collect(),
            InvocationMode::Shell => {
                let mut argv: Vec<OsString> = shell_prefix().iter().map(OsString::from).collect();
                argv.push(task.into());
                argv
            }
        }
    }
}

#[cfg(unix)]
fn shell_prefix() -> &'static [&'static str] {
    &["sh", "-c"]
}

#[cfg(not(unix))]
fn shell_prefix() -> &'static [&'static str] {
    &["cmd", "/C"]
}

impl fmt::Display for InvocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationMode::Whitespace => f.write_str("whitespace"),
            InvocationMode::Shell => f.write_str("shell"),
        }
    }
}

impl FromStr for InvocationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whitespace" => Ok(InvocationMode::Whitespace),
            "shell" => Ok(InvocationMode::Shell),
            other => Err(format!(
                "unknown invocation mode `{other}`, expected `whitespace` or `shell`"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(argv: Vec<OsString>) -> Vec<String> {
        argv.into_iter()
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn whitespace_mode_splits_on_any_whitespace() {
        let argv = InvocationMode::Whitespace.argv("echo  hello\tworld");
        assert_eq!(strings(argv), vec!["echo", "hello", "world"]);
    }

    #[test]
    fn whitespace_mode_does_not_honor_quotes() {
        let argv = InvocationMode::Whitespace.argv("echo \"a b\"");
        assert_eq!(strings(argv), vec!["echo", "\"a", "b\""]);
    }

    #[test]
    fn whitespace_mode_on_blank_input_is_empty() {
        assert!(InvocationMode::Whitespace.argv("   ").is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn shell_mode_passes_line_verbatim() {
        let argv = InvocationMode::Shell.argv("echo 'a b' | wc -c");
        assert_eq!(strings(argv), vec!["sh", "-c", "echo 'a b' | wc -c"]);
    }

    #[test]
    fn mode_parses_from_cli_spelling() {
        assert_eq!("shell".parse::<InvocationMode>(), Ok(InvocationMode::Shell));
        assert_eq!(
            "whitespace".parse::<InvocationMode>(),
            Ok(InvocationMode::Whitespace)
        );
        assert!("bash".parse::<InvocationMode>().is_err());
    }
}
