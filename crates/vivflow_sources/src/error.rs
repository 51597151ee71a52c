//! Input-discovery errors.
//!
//! All of these stop a workflow before any external process is spawned.

use std::path::PathBuf;

/// Errors raised while discovering and validating source inputs.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source directory does not exist or is not a directory.
    #[error("source directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// No design (non-testbench) Verilog files were found.
    #[error("no Verilog design files found in {}", .0.display())]
    NoDesignFiles(PathBuf),

    /// No testbench files were found; required for simulation.
    #[error(
        "no testbench files found in {} (testbench names contain '_tb', '_test', or 'testbench')",
        .0.display()
    )]
    NoTestbenchFiles(PathBuf),

    /// No `_top` file was found; required for hardware workflows.
    #[error("no top-tagged file found in {} (name the top-level design file '*_top.v')", .0.display())]
    NoTopFile(PathBuf),

    /// A required file declares no module.
    #[error("could not detect a module name in {}", .0.display())]
    ModuleNameNotFound(PathBuf),

    /// An I/O error occurred while reading a directory or file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_top_file_display() {
        let err = SourceError::NoTopFile(PathBuf::from("/work/adder"));
        assert!(err.to_string().starts_with("no top-tagged file found"));
        assert!(err.to_string().contains("/work/adder"));
    }

    #[test]
    fn no_testbench_display_mentions_patterns() {
        let err = SourceError::NoTestbenchFiles(PathBuf::from("d"));
        let msg = err.to_string();
        assert!(msg.contains("'_tb'"));
        assert!(msg.contains("'testbench'"));
    }

    #[test]
    fn module_name_not_found_display() {
        let err = SourceError::ModuleNameNotFound(PathBuf::from("empty.v"));
        assert_eq!(err.to_string(), "could not detect a module name in empty.v");
    }

    #[test]
    fn io_display() {
        let err = SourceError::io(
            "x.v",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "I/O error at x.v: gone");
    }
}
