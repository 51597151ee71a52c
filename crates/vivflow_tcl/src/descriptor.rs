//! The per-invocation project description consumed by the script builder.

use std::path::PathBuf;

use vivflow_config::BoardProfile;

/// Everything the builder needs to create a project from sources.
///
/// Assembled once per invocation and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectDescriptor {
    /// Project name passed to `create_project`.
    pub project_name: String,
    /// Directory the tool creates and owns.
    pub project_dir: PathBuf,
    /// Target board.
    pub board: BoardProfile,
    /// Design sources, in classification order.
    pub design_files: Vec<PathBuf>,
    /// Testbench sources, in classification order.
    pub testbench_files: Vec<PathBuf>,
    /// Pin/timing constraints, if one was found.
    pub constraint_file: Option<PathBuf>,
    /// Module set as the synthesis top.
    pub design_top: Option<String>,
    /// Module set as the simulation top.
    pub testbench_top: Option<String>,
}
