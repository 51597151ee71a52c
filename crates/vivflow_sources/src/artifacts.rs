//! Best-effort lookup of files the external tool writes into its project
//! directory.
//!
//! The layout is owned by the tool and may change between versions; every
//! lookup here returns `None` rather than an error when something is missing.

use std::path::{Path, PathBuf};

use crate::classify::files_with_extension;

/// Path of the tool's project file (`<dir>/<name>.xpr`).
pub fn project_file(project_dir: &Path, project_name: &str) -> PathBuf {
    project_dir.join(format!("{project_name}.xpr"))
}

/// Finds the generated bitstream.
///
/// Prefers `<dir>/<name>.runs/impl_1/<top>.bit`, then any `.bit` in that run
/// directory.
pub fn find_bitstream(project_dir: &Path, project_name: &str, top: Option<&str>) -> Option<PathBuf> {
    let run_dir = project_dir
        .join(format!("{project_name}.runs"))
        .join("impl_1");
    if let Some(top) = top {
        let exact = run_dir.join(format!("{top}.bit"));
        if exact.is_file() {
            return Some(exact);
        }
    }
    first_with_extension(&run_dir, "bit")
}

/// Finds the waveform database of the last behavioral simulation.
pub fn find_waveform_db(project_dir: &Path, project_name: &str) -> Option<PathBuf> {
    let sim_dir = project_dir
        .join(format!("{project_name}.sim"))
        .join("sim_1")
        .join("behav")
        .join("xsim");
    first_with_extension(&sim_dir, "wdb")
}

fn first_with_extension(dir: &Path, ext: &str) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }
    files_with_extension(dir, ext).ok()?.into_iter().next()
}
