//! `vivflow sim`: create a project from sources and run a behavioral
//! simulation.
//!
//! Batch mode (the default) waits for the tool and reports the waveform
//! database. `--gui` writes an interactive script, launches the tool, and
//! returns immediately.

use std::path::{Path, PathBuf};

use vivflow_config::BoardRegistry;
use vivflow_runner::RunResult;
use vivflow_sources::{
    classify_dir, find_constraint_file, find_waveform_db, require_module_name,
};
use vivflow_tcl::{build_script, ProjectDescriptor, SimulationPlan, Workflow, WorkflowKind};

use crate::pipeline::{
    abort_cancelled, cancelled, emit_report, external_tool, file_name, install_dir, load_settings,
    print_summary, project_dir_in, remove_stale_project, report_failure, run_tracked, status,
    write_script, Summary,
};
use crate::report::WorkflowReport;
use crate::stage::{StageTracker, WorkflowState};
use crate::{GlobalArgs, SimArgs};

const BATCH_SCRIPT_FILE: &str = "run_sim.tcl";
const GUI_SCRIPT_FILE: &str = "run_sim_gui.tcl";

/// Runs the `vivflow sim` command.
pub fn run(args: &SimArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    run_with_install_dir(args, global, install_dir().as_deref())
}

/// Runs the simulation workflow, searching `install_dir` first for a
/// constraint file.
pub(crate) fn run_with_install_dir(
    args: &SimArgs,
    global: &GlobalArgs,
    install_dir: Option<&Path>,
) -> Result<i32, Box<dyn std::error::Error>> {
    let mut tracker = StageTracker::new(WorkflowKind::Simulation);

    let sources = classify_dir(Path::new(&args.source_dir))?;
    tracker.advance(WorkflowState::Classified);
    status(
        global,
        "Classified",
        format!("{} source file(s) in {}", sources.files.len(), sources.dir.display()),
    );

    let design_top_file = sources.preferred_design_top()?;
    let testbench_file = sources.require_testbench()?;
    let testbench_top = require_module_name(testbench_file)?;
    let design_top = require_module_name(design_top_file)?;

    let config = load_settings(global, &sources.dir)?;
    let board = BoardRegistry::from_config(&config).resolve(args.board.as_deref());
    let constraint = find_constraint_file(install_dir, &sources.dir)?;
    tracker.advance(WorkflowState::Validated);

    let duration = args
        .time
        .clone()
        .unwrap_or_else(|| config.defaults.sim_time.clone());
    let interactive = args.gui;
    let mode = if interactive { "gui" } else { "batch" };

    let project_name = file_name(&sources.dir);
    let project_dir = project_dir_in(&sources.dir, &config.defaults.project_dir)?;

    print_summary(
        global,
        &Summary {
            project_name: &project_name,
            board: board.profile.to_string(),
            design_files: sources.design_files().map(|f| f.file_name()).collect(),
            design_top: Some(design_top.as_str()),
            testbench_files: sources.testbench_files().map(|f| f.file_name()).collect(),
            testbench_top: Some(testbench_top.as_str()),
            constraint: constraint.as_ref(),
            sim_time: Some(duration.as_str()),
            mode: mode.to_string(),
        },
    );

    let descriptor = ProjectDescriptor {
        project_name: project_name.clone(),
        project_dir: project_dir.clone(),
        board: board.profile.clone(),
        design_files: sources.design_files().map(|f| f.path.clone()).collect(),
        testbench_files: sources.testbench_files().map(|f| f.path.clone()).collect(),
        constraint_file: constraint.map(|c| c.path),
        design_top: Some(design_top),
        testbench_top: Some(testbench_top),
    };
    let plan = SimulationPlan {
        duration,
        waveform_view: !args.no_wave,
        keep_open: interactive,
    };
    let script = build_script(&descriptor, &Workflow::Simulation(plan));

    if cancelled(global) {
        return Ok(abort_cancelled(&mut tracker));
    }
    remove_stale_project(global, &project_dir)?;
    let script_file = if interactive {
        GUI_SCRIPT_FILE
    } else {
        BATCH_SCRIPT_FILE
    };
    let script_path = write_script(global, &script, &sources.dir, script_file)?;
    tracker.advance(WorkflowState::ScriptBuilt);

    let tool = external_tool(global, &config);
    let (result, artifact) = if interactive {
        let result = tool.launch_interactive(&script_path, &sources.dir).map_err(|e| {
            tracker.fail();
            e
        })?;
        if result.succeeded {
            status(global, "Launched", "simulation in the Vivado GUI");
        } else {
            eprintln!("error: cancelled");
        }
        (result, None)
    } else {
        let result = match run_tracked(
            global,
            &tool,
            &script_path,
            &sources.dir,
            &mut tracker,
            "Running simulation",
        ) {
            Ok(result) => result,
            Err(e) => {
                tracker.fail();
                return Err(e.into());
            }
        };
        let artifact = report_batch_outcome(global, &tracker, &result, &project_dir, &project_name);
        (result, artifact)
    };
    tracker.finish(&result);

    let mut report = WorkflowReport::new(
        "simulation",
        &tracker,
        &result,
        &project_name,
        project_dir,
        script_path,
        mode,
    );
    report.board = Some(board.profile.name.clone());
    report.artifact = artifact;
    emit_report(global, &report);

    Ok(if result.succeeded { 0 } else { 1 })
}

/// Prints the waveform location on success or the failure hint otherwise.
fn report_batch_outcome(
    global: &GlobalArgs,
    tracker: &StageTracker,
    result: &RunResult,
    project_dir: &Path,
    project_name: &str,
) -> Option<PathBuf> {
    if !result.succeeded {
        report_failure(tracker, result, project_dir);
        return None;
    }
    status(global, "Finished", "simulation completed");
    let wdb = find_waveform_db(project_dir, project_name);
    match &wdb {
        Some(path) => {
            status(global, "Waveform", path.display());
            if !global.quiet {
                eprintln!("             To view: vivado -mode gui");
                eprintln!("             File -> Open Waveform Database -> {}", file_name(path));
            }
        }
        None => log::info!("no waveform database under {}", project_dir.display()),
    }
    wdb
}
