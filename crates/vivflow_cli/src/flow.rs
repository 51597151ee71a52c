//! `vivflow flow`: synthesize, implement, write a bitstream and optionally
//! program, for a project that already exists. The project is never deleted.

use std::path::Path;

use vivflow_sources::{find_bitstream, project_file};
use vivflow_tcl::{build_existing_project_script, HardwarePlan, WorkflowKind};

use crate::pipeline::{
    abort_cancelled, cancelled, emit_report, external_tool, load_settings, report_failure,
    run_tracked, status, write_script,
};
use crate::report::WorkflowReport;
use crate::stage::{StageTracker, WorkflowState};
use crate::{FlowArgs, GlobalArgs};

const SCRIPT_FILE: &str = "run_hardware_flow.tcl";

/// Runs the `vivflow flow` command.
pub fn run(args: &FlowArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut tracker = StageTracker::new(WorkflowKind::Hardware);

    let project_dir = Path::new(&args.project_dir);
    let xpr = project_file(project_dir, &args.project_name);
    if !xpr.is_file() {
        return Err(format!("project file not found: {}", xpr.display()).into());
    }
    let project_dir = project_dir.canonicalize()?;
    let xpr = project_file(&project_dir, &args.project_name);
    tracker.advance(WorkflowState::Validated);

    let config = load_settings(global, &project_dir)?;
    status(global, "Project", xpr.display());
    status(
        global,
        "Mode",
        if args.no_program {
            "batch, bitstream only"
        } else {
            "batch, program device"
        },
    );

    let plan = HardwarePlan {
        program: !args.no_program,
    };
    if cancelled(global) {
        return Ok(abort_cancelled(&mut tracker));
    }
    let script = build_existing_project_script(&xpr, &plan);
    let script_path = write_script(global, &script, &project_dir, SCRIPT_FILE)?;
    tracker.advance(WorkflowState::ScriptBuilt);

    let tool = external_tool(global, &config);
    let result = match run_tracked(
        global,
        &tool,
        &script_path,
        &project_dir,
        &mut tracker,
        "Running hardware flow",
    ) {
        Ok(result) => result,
        Err(e) => {
            tracker.fail();
            return Err(e.into());
        }
    };
    tracker.finish(&result);

    let mut artifact = None;
    if result.succeeded {
        artifact = find_bitstream(&project_dir, &args.project_name, None);
        if let Some(bit) = &artifact {
            status(global, "Bitstream", bit.display());
        }
        status(global, "Finished", "hardware flow completed");
    } else {
        report_failure(&tracker, &result, &project_dir);
    }

    let mut report = WorkflowReport::new(
        "flow",
        &tracker,
        &result,
        &args.project_name,
        project_dir.clone(),
        script_path,
        "batch",
    );
    report.artifact = artifact;
    emit_report(global, &report);

    Ok(if result.succeeded { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::quiet_global;
    use std::fs;
    use tempfile::TempDir;

    fn flow_args(dir: &Path, name: &str) -> FlowArgs {
        FlowArgs {
            project_dir: dir.display().to_string(),
            project_name: name.to_string(),
            no_program: true,
        }
    }

    #[test]
    fn missing_project_file() {
        let tmp = TempDir::new().unwrap();
        let err = run(&flow_args(tmp.path(), "blinky"), &quiet_global()).unwrap_err();
        assert!(err.to_string().starts_with("project file not found"));
        assert!(err.to_string().contains("blinky.xpr"));
        assert!(!tmp.path().join(SCRIPT_FILE).exists());
    }

    #[test]
    fn interrupt_before_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("blinky.xpr"), "<Project/>").unwrap();
        let mut global = quiet_global();
        global.tool = Some("/nonexistent/vivado".into());
        global.cancel.store(true, std::sync::atomic::Ordering::SeqCst);
        let code = run(&flow_args(tmp.path(), "blinky"), &global).unwrap();
        assert_eq!(code, 1);
        assert!(!tmp.path().join(SCRIPT_FILE).exists());
    }

    #[cfg(unix)]
    #[test]
    fn existing_project_run() {
        let tmp = TempDir::new().unwrap();
        let proj = tmp.path().join("proj");
        fs::create_dir(&proj).unwrap();
        fs::write(proj.join("blinky.xpr"), "<Project/>").unwrap();
        let run_dir = proj.join("blinky.runs").join("impl_1");
        fs::create_dir_all(&run_dir).unwrap();
        fs::write(run_dir.join("blinky_top.bit"), "").unwrap();

        let stub = tmp.path().join("fake_vivado.sh");
        fs::write(&stub, "echo 'Running Synthesis...'\nexit 0\n").unwrap();
        fs::write(
            proj.join("vivflow.toml"),
            format!("[tool]\npath = \"/bin/sh\"\nextra_args = ['{}']\n", stub.display()),
        )
        .unwrap();

        let code = run(&flow_args(&proj, "blinky"), &quiet_global()).unwrap();
        assert_eq!(code, 0);
        assert!(proj.join("blinky.xpr").exists());
        assert!(run_dir.join("blinky_top.bit").exists());

        let script = fs::read_to_string(proj.join(SCRIPT_FILE)).unwrap();
        assert!(script.contains("open_project {"));
        assert!(script.contains("blinky.xpr}"));
        assert!(!script.contains("create_project"));
        assert!(!script.contains("program_hw_devices"));
    }
}
