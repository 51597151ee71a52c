//! `vivflow hw`: create a project from sources, build a bitstream, and
//! program the board.
//!
//! Classification and validation errors stop before anything is written or
//! spawned. A missing constraint file asks for confirmation unless `--yes`.
//! After a successful programming run, `--gui` opens the device manager as a
//! best-effort follow-on session.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use vivflow_config::BoardRegistry;
use vivflow_runner::{ExternalTool, RunResult};
use vivflow_sources::{
    classify_dir, find_bitstream, find_constraint_file, project_file, require_module_name,
    ConstraintFile, ConstraintOrigin, TopPolicy,
};
use vivflow_tcl::{
    build_device_manager_script, build_script, HardwarePlan, ProjectDescriptor, Workflow,
    WorkflowKind,
};

use crate::pipeline::{
    abort_cancelled, cancelled, emit_report, external_tool, file_name, install_dir, load_settings,
    print_summary, project_dir_in, remove_stale_project, report_failure, run_tracked, status,
    write_script, Summary,
};
use crate::prompt::confirm;
use crate::report::WorkflowReport;
use crate::stage::{StageTracker, WorkflowState};
use crate::{GlobalArgs, HwArgs};

const SCRIPT_FILE: &str = "run_hardware.tcl";
const DEVICE_MANAGER_SCRIPT_FILE: &str = "run_program_gui.tcl";

/// Runs the `vivflow hw` command.
pub fn run(args: &HwArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    run_with_input(args, global, &mut stdin.lock(), install_dir().as_deref())
}

/// Runs the hardware workflow, reading any confirmation from `input` and
/// searching `install_dir` first for a constraint file.
pub(crate) fn run_with_input<R: BufRead>(
    args: &HwArgs,
    global: &GlobalArgs,
    input: &mut R,
    install_dir: Option<&Path>,
) -> Result<i32, Box<dyn std::error::Error>> {
    let mut tracker = StageTracker::new(WorkflowKind::Hardware);

    let sources = classify_dir(Path::new(&args.source_dir))?;
    tracker.advance(WorkflowState::Classified);
    status(
        global,
        "Classified",
        format!("{} source file(s) in {}", sources.files.len(), sources.dir.display()),
    );

    let policy = if args.implicit_top {
        TopPolicy::FirstDesign
    } else {
        TopPolicy::Explicit
    };
    let top_file = sources.require_top(policy)?;
    let design_top = require_module_name(top_file)?;

    let config = load_settings(global, &sources.dir)?;
    let board = BoardRegistry::from_config(&config).resolve(args.board.as_deref());

    let constraint = match &args.constraint {
        Some(path) => Some(explicit_constraint(path)?),
        None => find_constraint_file(install_dir, &sources.dir)?,
    };
    if constraint.is_none() && !confirm_without_constraints(global, args.yes, input)? {
        eprintln!("error: aborted, no constraint file");
        return Ok(1);
    }
    tracker.advance(WorkflowState::Validated);

    let project_name = file_name(&sources.dir);
    let project_dir = project_dir_in(&sources.dir, &config.defaults.project_dir)?;
    let design_files: Vec<PathBuf> = sources.design_files().map(|f| f.path.clone()).collect();
    let testbench_files: Vec<PathBuf> =
        sources.testbench_files().map(|f| f.path.clone()).collect();

    print_summary(
        global,
        &Summary {
            project_name: &project_name,
            board: board.profile.to_string(),
            design_files: sources.design_files().map(|f| f.file_name()).collect(),
            design_top: Some(design_top.as_str()),
            testbench_files: sources.testbench_files().map(|f| f.file_name()).collect(),
            testbench_top: None,
            constraint: constraint.as_ref(),
            sim_time: None,
            mode: if args.no_program {
                "batch, bitstream only".to_string()
            } else {
                "batch, program device".to_string()
            },
        },
    );

    let descriptor = ProjectDescriptor {
        project_name: project_name.clone(),
        project_dir: project_dir.clone(),
        board: board.profile.clone(),
        design_files,
        testbench_files,
        constraint_file: constraint.map(|c| c.path),
        design_top: Some(design_top.clone()),
        testbench_top: None,
    };
    let program = !args.no_program;
    let script = build_script(&descriptor, &Workflow::Hardware(HardwarePlan { program }));

    if cancelled(global) {
        return Ok(abort_cancelled(&mut tracker));
    }
    remove_stale_project(global, &project_dir)?;
    let script_path = write_script(global, &script, &sources.dir, SCRIPT_FILE)?;
    tracker.advance(WorkflowState::ScriptBuilt);

    let tool = external_tool(global, &config);
    let result = match run_tracked(
        global,
        &tool,
        &script_path,
        &sources.dir,
        &mut tracker,
        "Running hardware flow",
    ) {
        Ok(result) => result,
        Err(e) => {
            tracker.fail();
            return Err(e.into());
        }
    };

    let mut artifact = None;
    let mut device_manager = None;
    if result.succeeded {
        artifact = find_bitstream(&project_dir, &project_name, Some(design_top.as_str()));
        match &artifact {
            Some(bit) => status(global, "Bitstream", bit.display()),
            None => log::warn!("bitstream not found under {}", project_dir.display()),
        }
        if program && args.gui {
            let launched = !cancelled(global)
                && open_device_manager(global, &tool, &sources.dir, &project_dir, &project_name);
            if launched {
                tracker.advance(WorkflowState::ProgrammingLaunched);
            }
            device_manager = Some(launched);
        }
    }
    tracker.finish(&result);

    if result.succeeded {
        status(global, "Finished", "hardware flow completed");
    } else {
        report_failure(&tracker, &result, &project_dir);
    }

    let mut report = WorkflowReport::new(
        "hardware",
        &tracker,
        &result,
        &project_name,
        project_dir,
        script_path,
        "batch",
    );
    report.board = Some(board.profile.name.clone());
    report.artifact = artifact;
    report.device_manager = device_manager;
    emit_report(global, &report);

    Ok(exit_code(&result))
}

fn explicit_constraint(path: &str) -> Result<ConstraintFile, Box<dyn std::error::Error>> {
    let path = Path::new(path);
    if !path.is_file() {
        return Err(format!("constraint file not found: {}", path.display()).into());
    }
    Ok(ConstraintFile {
        path: path.canonicalize()?,
        origin: ConstraintOrigin::Explicit,
    })
}

fn confirm_without_constraints<R: BufRead>(
    global: &GlobalArgs,
    yes: bool,
    input: &mut R,
) -> io::Result<bool> {
    if !global.quiet {
        eprintln!("warning: no constraint file (.xdc) found");
        eprintln!("         synthesis will likely fail without pin constraints");
    }
    if yes {
        return Ok(true);
    }
    confirm(input, &mut io::stderr(), "Continue anyway? (y/n): ")
}

/// Launches the interactive device manager and returns whether it started.
/// Failure prints manual steps and does not fail the workflow.
fn open_device_manager(
    global: &GlobalArgs,
    tool: &ExternalTool,
    source_dir: &Path,
    project_dir: &Path,
    project_name: &str,
) -> bool {
    let xpr = project_file(project_dir, project_name);
    let script = build_device_manager_script(&xpr);
    let launched = write_script(global, &script, source_dir, DEVICE_MANAGER_SCRIPT_FILE)
        .and_then(|path| Ok(tool.launch_interactive(&path, source_dir)?));
    match launched {
        Ok(result) if result.succeeded => {
            status(global, "Launched", "device manager");
            true
        }
        Ok(_) => false,
        Err(e) => {
            eprintln!("warning: could not open the device manager: {e}");
            eprintln!("  To program manually:");
            eprintln!("    1. Open {} in Vivado", xpr.display());
            eprintln!("    2. Open Hardware Manager -> Open Target -> Auto Connect");
            eprintln!("    3. Program Device");
            false
        }
    }
}

fn exit_code(result: &RunResult) -> i32 {
    if result.succeeded {
        0
    } else {
        1
    }
}
