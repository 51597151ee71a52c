//! The outcome of one external-tool invocation.

use std::fmt;

/// How the tool process ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The process exited; `None` means it was killed by a signal.
    Exited(Option<i32>),
    /// The configured timeout elapsed and the process was killed.
    TimedOut,
    /// The operator cancelled and the process was killed.
    Cancelled,
    /// An interactive session was launched and not waited for.
    Detached,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(Some(code)) => write!(f, "exited with code {code}"),
            Termination::Exited(None) => write!(f, "terminated by signal"),
            Termination::TimedOut => write!(f, "timed out"),
            Termination::Cancelled => write!(f, "cancelled"),
            Termination::Detached => write!(f, "launched interactively"),
        }
    }
}

/// Terminal outcome of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResult {
    /// `true` only for a zero exit code or a detached launch.
    pub succeeded: bool,
    /// Process exit code, when one was observed.
    pub exit_code: Option<i32>,
    /// How the process ended.
    pub termination: Termination,
    /// Merged stdout/stderr, one line per `\n`.
    pub captured_output: String,
    /// Last line mentioning `ERROR`, filled in on failure.
    pub last_error_line: Option<String>,
}

impl RunResult {
    /// Builds the result of a supervised batch run.
    pub fn from_batch(termination: Termination, captured_output: String) -> Self {
        let exit_code = match termination {
            Termination::Exited(code) => code,
            _ => None,
        };
        let succeeded = termination == Termination::Exited(Some(0));
        let last_error_line = if succeeded {
            None
        } else {
            last_error_line(&captured_output)
        };
        Self {
            succeeded,
            exit_code,
            termination,
            captured_output,
            last_error_line,
        }
    }

    /// The result of a fire-and-forget interactive launch.
    pub fn detached() -> Self {
        Self {
            succeeded: true,
            exit_code: None,
            termination: Termination::Detached,
            captured_output: String::new(),
            last_error_line: None,
        }
    }
}

/// Returns the last line of `output` containing `ERROR`, trimmed.
pub fn last_error_line(output: &str) -> Option<String> {
    output
        .lines()
        .rev()
        .find(|line| line.contains("ERROR"))
        .map(|line| line.trim().to_string())
}
