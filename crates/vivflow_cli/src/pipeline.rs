//! Shared pipeline helpers for the `hw`, `sim` and `flow` commands.
//!
//! Configuration loading and flag overrides, the tool handle, stale project
//! removal, script writing, the tracked batch run, and terminal output.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Duration;

use vivflow_config::{find_config, VivflowConfig};
use vivflow_runner::{ExternalTool, RunError, RunResult, Termination};
use vivflow_sources::ConstraintFile;
use vivflow_tcl::ControlScript;

use crate::report::WorkflowReport;
use crate::stage::StageTracker;
use crate::ticker::StatusTicker;
use crate::{GlobalArgs, OutputFormat};

/// Prints a right-aligned status line to stderr unless `--quiet`.
pub fn status(global: &GlobalArgs, verb: &str, message: impl Display) {
    if !global.quiet {
        eprintln!("{verb:>12} {message}");
    }
}

/// Loads `--config`, or `vivflow.toml` from `dir`, or the defaults.
pub fn load_settings(global: &GlobalArgs, dir: &Path) -> Result<VivflowConfig, Box<dyn std::error::Error>> {
    let explicit = global.config.as_deref().map(Path::new);
    Ok(find_config(explicit, dir)?)
}

/// Builds the tool handle, with command-line overrides applied over `config`.
pub fn external_tool(global: &GlobalArgs, config: &VivflowConfig) -> ExternalTool {
    let program = global
        .tool
        .clone()
        .unwrap_or_else(|| config.tool.path.clone());
    let timeout = global
        .timeout
        .map(Duration::from_secs)
        .or_else(|| config.tool.timeout());
    ExternalTool::new(program)
        .with_extra_args(config.tool.extra_args.clone())
        .with_timeout(timeout)
        .with_cancel_flag(global.cancel.clone())
}

/// Directory holding the running executable, searched first for constraints.
pub fn install_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent().map(Path::to_path_buf)
}

/// Project directory `name` inside `source_dir`.
///
/// Only a plain relative path below the source directory is accepted, since
/// the directory is deleted before every run.
pub fn project_dir_in(source_dir: &Path, name: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let relative = Path::new(name);
    let plain = relative
        .components()
        .all(|c| matches!(c, std::path::Component::Normal(_)));
    if !plain || relative.as_os_str().is_empty() {
        return Err(format!(
            "project directory '{name}' must be a relative path inside the source directory"
        )
        .into());
    }
    Ok(source_dir.join(relative))
}

/// Whether an interrupt has been received.
pub fn cancelled(global: &GlobalArgs) -> bool {
    global.cancel.load(Ordering::SeqCst)
}

/// Ends a workflow interrupted before the tool started. Nothing is deleted,
/// written or spawned after this point.
pub fn abort_cancelled(tracker: &mut StageTracker) -> i32 {
    tracker.fail();
    eprintln!("error: cancelled");
    1
}

/// Deletes a previous project directory. Returns whether one was removed.
pub fn remove_stale_project(global: &GlobalArgs, project_dir: &Path) -> std::io::Result<bool> {
    if !project_dir.exists() {
        return Ok(false);
    }
    status(global, "Removing", format!("old project {}", project_dir.display()));
    std::fs::remove_dir_all(project_dir)?;
    Ok(true)
}

/// Writes `script` to `dir/file_name` and returns its path.
pub fn write_script(
    global: &GlobalArgs,
    script: &ControlScript,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.join(file_name);
    script
        .write_to(&path)
        .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    if global.verbose {
        status(global, "Generated", path.display());
    } else {
        status(global, "Generated", file_name);
    }
    Ok(path)
}

/// Runs `script` in batch mode, relaying output through a ticker and feeding
/// stage banners to `tracker`.
pub fn run_tracked(
    global: &GlobalArgs,
    tool: &ExternalTool,
    script: &Path,
    cwd: &Path,
    tracker: &mut StageTracker,
    message: &str,
) -> Result<RunResult, RunError> {
    let ticker = StatusTicker::start(message, !global.quiet);
    let result = tool.run_batch(script, cwd, |line| {
        if let Some(stage) = tracker.observe(line) {
            ticker.set_stage(stage);
        }
        if !global.quiet {
            ticker.println(line);
        }
    });
    match &result {
        Ok(r) => ticker.finish(r.succeeded),
        Err(_) => ticker.finish(false),
    }
    result
}

/// Explains a failed batch run: the termination, the failing stage, the
/// error hint and where the full log lives. Always printed, even with
/// `--quiet`.
pub fn report_failure(tracker: &StageTracker, result: &RunResult, project_dir: &Path) {
    match result.termination {
        Termination::TimedOut => eprintln!("error: the tool timed out and was stopped"),
        Termination::Cancelled => eprintln!("error: cancelled"),
        termination => match tracker.failed_stage() {
            Some(stage) => eprintln!("error: {stage} failed, tool {termination}"),
            None => eprintln!("error: tool {termination}"),
        },
    }
    if let Some(line) = &result.last_error_line {
        eprintln!("  {line}");
    }
    eprintln!("  Full log: {}", project_dir.display());
}

/// Prints the report as JSON on stdout when `--format json` was given.
pub fn emit_report(global: &GlobalArgs, report: &WorkflowReport) {
    if global.format == OutputFormat::Json {
        println!("{}", report.to_json());
    }
}

/// What gets echoed before a project is built.
pub struct Summary<'a> {
    /// Project name.
    pub project_name: &'a str,
    /// Board description.
    pub board: String,
    /// Design file names.
    pub design_files: Vec<String>,
    /// Synthesis top module.
    pub design_top: Option<&'a str>,
    /// Testbench file names.
    pub testbench_files: Vec<String>,
    /// Simulation top module.
    pub testbench_top: Option<&'a str>,
    /// Constraint file, if any.
    pub constraint: Option<&'a ConstraintFile>,
    /// Simulation time, for simulation workflows.
    pub sim_time: Option<&'a str>,
    /// `batch`, `gui`, or a description of the programming step.
    pub mode: String,
}

/// Prints the pre-build summary banner.
pub fn print_summary(global: &GlobalArgs, summary: &Summary<'_>) {
    status(global, "Project", summary.project_name);
    status(global, "Board", &summary.board);
    status(
        global,
        "Design",
        with_top(&summary.design_files, summary.design_top),
    );
    if !summary.testbench_files.is_empty() {
        status(
            global,
            "Testbench",
            with_top(&summary.testbench_files, summary.testbench_top),
        );
    }
    match summary.constraint {
        Some(c) => status(
            global,
            "Constraints",
            format!("{} ({})", file_name(&c.path), c.origin),
        ),
        None => status(global, "Constraints", "none"),
    }
    if let Some(time) = summary.sim_time {
        status(global, "Sim time", time);
    }
    status(global, "Mode", &summary.mode);
}

/// Final path component as a display string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn with_top(files: &[String], top: Option<&str>) -> String {
    let list = files.join(", ");
    match top {
        Some(top) => format!("{list} (top: {top})"),
        None => list,
    }
}

/// Quiet, text-format settings with a fresh cancel flag.
#[cfg(test)]
pub(crate) fn quiet_global() -> GlobalArgs {
    GlobalArgs {
        quiet: true,
        verbose: false,
        config: None,
        tool: None,
        timeout: None,
        format: OutputFormat::Text,
        cancel: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
    }
}
