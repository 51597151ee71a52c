//! Source discovery for the vivflow workflows.
//!
//! Scans a directory for Verilog sources, assigns each file a role from its
//! name, extracts declared module names, and locates constraint files and the
//! artifacts the external tool leaves behind.

#![warn(missing_docs)]

pub mod artifacts;
pub mod classify;
pub mod constraints;
pub mod error;
pub mod module_name;

pub use artifacts::{find_bitstream, find_waveform_db, project_file};
pub use classify::{
    classify_dir, classify_stem, ClassifiedSources, SourceFile, SourceRole, TopPolicy,
    HDL_EXTENSION,
};
pub use constraints::{find_constraint_file, ConstraintFile, ConstraintOrigin};
pub use error::SourceError;
pub use module_name::{extract_module_name, module_name_in_file, require_module_name};
