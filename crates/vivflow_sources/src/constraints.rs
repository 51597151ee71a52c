//! Constraint (`.xdc`) file lookup.
//!
//! The installation directory is searched first so a single board constraint
//! file can serve every design; the source directory is the fallback.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::classify::files_with_extension;
use crate::error::SourceError;

/// Extension of pin/timing constraint files.
pub const CONSTRAINT_EXTENSION: &str = "xdc";

/// Where a constraint file was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintOrigin {
    /// Given on the command line.
    Explicit,
    /// Next to the installed program.
    InstallDir,
    /// In the source directory.
    SourceDir,
}

impl fmt::Display for ConstraintOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintOrigin::Explicit => write!(f, "command line"),
            ConstraintOrigin::InstallDir => write!(f, "installation directory"),
            ConstraintOrigin::SourceDir => write!(f, "source directory"),
        }
    }
}

/// A located constraint file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintFile {
    /// Path of the file.
    pub path: PathBuf,
    /// Where it was found.
    pub origin: ConstraintOrigin,
}

/// Finds the constraint file for a project.
///
/// Returns the first `.xdc` (by file name) in `install_dir`, else the first in
/// `source_dir`, else `None`. An unreadable or absent `install_dir` is skipped.
pub fn find_constraint_file(
    install_dir: Option<&Path>,
    source_dir: &Path,
) -> Result<Option<ConstraintFile>, SourceError> {
    if let Some(dir) = install_dir.filter(|d| d.is_dir()) {
        match files_with_extension(dir, CONSTRAINT_EXTENSION) {
            Ok(files) => {
                if let Some(path) = files.into_iter().next() {
                    return Ok(Some(ConstraintFile {
                        path,
                        origin: ConstraintOrigin::InstallDir,
                    }));
                }
            }
            Err(e) => log::debug!("skipping install dir {}: {e}", dir.display()),
        }
    }
    let files = files_with_extension(source_dir, CONSTRAINT_EXTENSION)
        .map_err(|e| SourceError::io(source_dir, e))?;
    Ok(files.into_iter().next().map(|path| ConstraintFile {
        path,
        origin: ConstraintOrigin::SourceDir,
    }))
}
