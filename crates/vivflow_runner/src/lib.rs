//! Runs the external tool on a generated control script.
//!
//! Batch runs stream merged stdout/stderr line by line to a caller-supplied
//! callback while keeping the full text, and honour an optional timeout and
//! a shared cancellation flag. Interactive runs are launched and left to the
//! operator.

#![warn(missing_docs)]

pub mod error;
pub mod result;
pub mod tool;

pub use error::RunError;
pub use result::{last_error_line, RunResult, Termination};
pub use tool::{ExternalTool, LaunchMode};
