//! Tool-invocation errors.
//!
//! A tool that starts and then fails is not an error here; it is reported as
//! an unsuccessful [`RunResult`](crate::RunResult).

use std::path::PathBuf;

/// Errors raised when the external tool cannot be started or supervised.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The executable could not be located.
    #[error(
        "external tool not found: {} (install Vivado, add it to PATH, or set [tool] path / --tool)",
        .program.display()
    )]
    ToolNotFound {
        /// The configured program name or path.
        program: PathBuf,
    },

    /// The executable was found but the process could not be started.
    #[error("failed to start {}: {source}", .program.display())]
    Spawn {
        /// The resolved executable.
        program: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O error occurred while supervising the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
