//! Machine-readable summary of one workflow run (`--format json`).

use std::path::PathBuf;

use serde::Serialize;
use vivflow_runner::RunResult;

use crate::stage::StageTracker;

/// Final outcome of a `hw`, `sim` or `flow` invocation.
#[derive(Debug, Serialize)]
pub struct WorkflowReport {
    /// `hardware`, `simulation` or `flow`.
    pub workflow: &'static str,
    /// Whether the workflow succeeded.
    pub success: bool,
    /// Final state-machine state.
    pub state: String,
    /// Stage that failed, when known.
    pub failed_stage: Option<String>,
    /// Project name.
    pub project_name: String,
    /// Tool-owned project directory.
    pub project_dir: PathBuf,
    /// Resolved board, when the project was created from sources.
    pub board: Option<String>,
    /// Generated control script.
    pub script: PathBuf,
    /// `batch` or `gui`.
    pub mode: &'static str,
    /// How the tool process ended.
    pub termination: String,
    /// Tool exit code, when observed.
    pub exit_code: Option<i32>,
    /// Best-effort error hint from the tool output.
    pub last_error_line: Option<String>,
    /// Bitstream or waveform database produced by the run.
    pub artifact: Option<PathBuf>,
    /// Whether the device manager follow-on was launched, when one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_manager: Option<bool>,
}

impl WorkflowReport {
    /// Builds a report from the tracker and run outcome.
    pub fn new(
        workflow: &'static str,
        tracker: &StageTracker,
        result: &RunResult,
        project_name: &str,
        project_dir: PathBuf,
        script: PathBuf,
        mode: &'static str,
    ) -> Self {
        Self {
            workflow,
            success: result.succeeded,
            state: tracker.state().to_string(),
            failed_stage: tracker.failed_stage().map(|s| s.to_string()),
            project_name: project_name.to_string(),
            project_dir,
            board: None,
            script,
            mode,
            termination: result.termination.to_string(),
            exit_code: result.exit_code,
            last_error_line: result.last_error_line.clone(),
            artifact: None,
            device_manager: None,
        }
    }

    /// Renders the report as pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
