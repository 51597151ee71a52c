//! Assembles control scripts for each workflow.
//!
//! All builders are pure: the same inputs always produce an identical
//! [`ControlScript`], and nothing here reads the filesystem or spawns a
//! process.

use std::fmt;
use std::path::Path;

use crate::descriptor::ProjectDescriptor;
use crate::directive::{
    Directive, FileSet, RunStep, TopScope, PROGRAMMED_LINE, PROGRAMMING_BANNER, SIMULATION_BANNER,
};
use crate::script::ControlScript;

/// Options for the staged synthesis/implementation/bitstream flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HardwarePlan {
    /// Program the first enumerated device after the bitstream is written.
    pub program: bool,
}

/// Options for a behavioral simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationPlan {
    /// Duration handed to `run` without interpretation (`"1000ns"`, `"10us"`).
    pub duration: String,
    /// Add every top-level signal to the waveform view.
    pub waveform_view: bool,
    /// Leave the simulation open for an operator instead of saving and exiting.
    pub keep_open: bool,
}

/// The action part of a from-sources script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Workflow {
    /// Synthesize, implement, write a bitstream, optionally program.
    Hardware(HardwarePlan),
    /// Run a behavioral simulation.
    Simulation(SimulationPlan),
}

/// Discriminant of a [`Workflow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowKind {
    /// Hardware flow.
    Hardware,
    /// Simulation flow.
    Simulation,
}

impl Workflow {
    /// Which kind of workflow this is.
    pub fn kind(&self) -> WorkflowKind {
        match self {
            Workflow::Hardware(_) => WorkflowKind::Hardware,
            Workflow::Simulation(_) => WorkflowKind::Simulation,
        }
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowKind::Hardware => write!(f, "hardware"),
            WorkflowKind::Simulation => write!(f, "simulation"),
        }
    }
}

/// Builds the script that creates a project from sources and runs `workflow`.
///
/// Emission order: project creation (board part caught), design files,
/// testbench files, constraint file, top modules, compile-order refresh, then
/// the workflow's actions.
pub fn build_script(descriptor: &ProjectDescriptor, workflow: &Workflow) -> ControlScript {
    let kind = workflow.kind();
    let mut script = ControlScript::new();
    script.push(Directive::Comment(format!(
        "{kind} script for {}, generated by vivflow",
        descriptor.project_name
    )));
    script.push(Directive::Blank);

    script.push(Directive::CreateProject {
        name: descriptor.project_name.clone(),
        dir: descriptor.project_dir.clone(),
        part: descriptor.board.part.clone(),
    });
    if let Some(board_part) = &descriptor.board.board_part {
        script.push(Directive::SetBoardPart(board_part.clone()));
    }
    script.push(Directive::SetTargetLanguage);
    script.push(Directive::Blank);

    for path in &descriptor.design_files {
        script.push(Directive::AddFile {
            fileset: FileSet::Sources,
            path: path.clone(),
        });
    }
    for path in &descriptor.testbench_files {
        script.push(Directive::AddFile {
            fileset: FileSet::Simulation,
            path: path.clone(),
        });
    }
    if let Some(xdc) = &descriptor.constraint_file {
        script.push(Directive::AddFile {
            fileset: FileSet::Constraints,
            path: xdc.clone(),
        });
    }
    script.push(Directive::Blank);

    if let Some(top) = &descriptor.design_top {
        script.push(Directive::SetTop {
            scope: TopScope::Design,
            module: top.clone(),
        });
    }
    if kind == WorkflowKind::Simulation {
        if let Some(tb_top) = &descriptor.testbench_top {
            script.push(Directive::SetTop {
                scope: TopScope::Simulation,
                module: tb_top.clone(),
            });
        }
    }
    script.push(Directive::UpdateCompileOrder(FileSet::Sources));
    if kind == WorkflowKind::Simulation {
        script.push(Directive::UpdateCompileOrder(FileSet::Simulation));
    }
    script.push(Directive::Blank);

    match workflow {
        Workflow::Hardware(plan) => push_hardware_actions(&mut script, plan),
        Workflow::Simulation(plan) => push_simulation_actions(&mut script, plan),
    }
    script
}

/// Builds the script that opens an existing project file and runs the staged
/// hardware flow on it.
pub fn build_existing_project_script(project_file: &Path, plan: &HardwarePlan) -> ControlScript {
    let mut script = ControlScript::new();
    script.push(Directive::Comment(
        "hardware flow for an existing project, generated by vivflow".into(),
    ));
    script.push(Directive::Blank);
    script.push(Directive::OpenProject(project_file.to_path_buf()));
    script.push(Directive::Blank);
    push_hardware_actions(&mut script, plan);
    script
}

/// Builds the interactive follow-on script that opens the device manager with
/// the project loaded. A missing hardware target is reported, not fatal.
pub fn build_device_manager_script(project_file: &Path) -> ControlScript {
    let mut script = ControlScript::new();
    script.push(Directive::Comment(
        "device manager session, generated by vivflow".into(),
    ));
    script.push(Directive::Blank);
    script.push(Directive::OpenProject(project_file.to_path_buf()));
    script.push(Directive::OpenHwManager);
    script.push(Directive::ConnectHwServer);
    script.push(Directive::OpenHwTarget {
        abort_on_failure: false,
    });
    script
}

fn push_hardware_actions(script: &mut ControlScript, plan: &HardwarePlan) {
    for step in RunStep::ALL {
        script.push(Directive::Banner(step.banner().into()));
        if step != RunStep::Bitstream {
            script.push(Directive::ResetRun(step));
        }
        script.push(Directive::LaunchRun(step));
        script.push(Directive::WaitOnRun(step));
        script.push(Directive::RequireStatus(step));
        script.push(Directive::Puts(step.success_line().into()));
        script.push(Directive::Blank);
    }

    if plan.program {
        script.extend([
            Directive::Banner(PROGRAMMING_BANNER.into()),
            Directive::OpenHwManager,
            Directive::ConnectHwServer,
            Directive::OpenHwTarget {
                abort_on_failure: true,
            },
            Directive::SelectFirstDevice,
            Directive::AssignBitstream,
            Directive::ProgramDevice,
            Directive::RefreshDevice,
            Directive::Puts(PROGRAMMED_LINE.into()),
            Directive::CloseHwManager,
            Directive::Blank,
        ]);
    }

    script.extend([
        Directive::CloseProject,
        Directive::Banner("Hardware flow completed successfully".into()),
        Directive::Exit(0),
    ]);
}

fn push_simulation_actions(script: &mut ControlScript, plan: &SimulationPlan) {
    script.push(Directive::Banner(SIMULATION_BANNER.into()));
    script.push(Directive::LaunchSimulation);
    script.push(Directive::RunFor(plan.duration.clone()));
    if plan.waveform_view {
        script.push(Directive::AddWaveAll);
    }
    if plan.keep_open {
        return;
    }
    script.extend([
        Directive::SaveWaveConfig,
        Directive::CloseSim,
        Directive::CloseProject,
        Directive::Banner("Simulation completed successfully".into()),
        Directive::Exit(0),
    ]);
}
