//! Control-script generation for the external tool.
//!
//! A [`ControlScript`] is an ordered list of typed [`Directive`] values. The
//! builder functions in [`builder`] assemble scripts from a
//! [`ProjectDescriptor`] and a [`Workflow`]; they are pure and never touch the
//! filesystem or spawn processes. Text is produced only when a script is
//! rendered or written out.

#![warn(missing_docs)]

pub mod builder;
pub mod descriptor;
pub mod directive;
pub mod script;

pub use builder::{
    build_device_manager_script, build_existing_project_script, build_script, HardwarePlan,
    SimulationPlan, Workflow, WorkflowKind,
};
pub use descriptor::ProjectDescriptor;
pub use directive::{
    Directive, FileSet, RunStep, TopScope, PROGRAMMED_LINE, PROGRAMMING_BANNER, SIMULATION_BANNER,
};
pub use script::ControlScript;
