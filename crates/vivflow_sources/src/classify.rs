//! Source file discovery and role classification.
//!
//! Roles are inferred once from the file stem, case-insensitively:
//! a stem containing `_tb`, `_test`, or `testbench` is a testbench; otherwise
//! a stem containing `_top` is a top-tagged design file; anything else is a
//! plain design file. The testbench check takes precedence, so `alu_top_tb.v`
//! is a testbench.

use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// Extension of the hardware-description sources this tool handles.
pub const HDL_EXTENSION: &str = "v";

const TESTBENCH_MARKERS: &[&str] = &["_tb", "_test", "testbench"];
const TOP_MARKER: &str = "_top";

/// The role a source file plays in a project.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceRole {
    /// A synthesizable design file.
    Design,
    /// A design file that is also tagged as the top level.
    Top,
    /// A simulation-only testbench.
    Testbench,
}

impl SourceRole {
    /// Whether the file belongs to the design sources (plain or top-tagged).
    pub fn is_design(self) -> bool {
        matches!(self, SourceRole::Design | SourceRole::Top)
    }
}

/// How a hardware workflow picks its top-level file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TopPolicy {
    /// Require a `_top` file.
    #[default]
    Explicit,
    /// Fall back to the first design file when no `_top` file exists.
    FirstDesign,
}

/// A discovered source file and its inferred role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// File name without extension.
    pub stem: String,
    /// Role inferred from the stem.
    pub role: SourceRole,
}

impl SourceFile {
    /// Classifies a path by its file stem.
    pub fn from_path(path: PathBuf) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let role = classify_stem(&stem);
        Self { path, stem, role }
    }

    /// File name for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.stem.clone())
    }
}

/// Infers the role of a file from its stem.
pub fn classify_stem(stem: &str) -> SourceRole {
    let lower = stem.to_lowercase();
    if TESTBENCH_MARKERS.iter().any(|m| lower.contains(m)) {
        SourceRole::Testbench
    } else if lower.contains(TOP_MARKER) {
        SourceRole::Top
    } else {
        SourceRole::Design
    }
}

/// The classified contents of one source directory, in file-name order.
#[derive(Clone, Debug)]
pub struct ClassifiedSources {
    /// The scanned directory (absolute).
    pub dir: PathBuf,
    /// All discovered files, sorted by file name.
    pub files: Vec<SourceFile>,
}

impl ClassifiedSources {
    /// Design files, including top-tagged ones.
    pub fn design_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| f.role.is_design())
    }

    /// Testbench files.
    pub fn testbench_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files
            .iter()
            .filter(|f| f.role == SourceRole::Testbench)
    }

    /// The first top-tagged design file, if any.
    pub fn top_file(&self) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.role == SourceRole::Top)
    }

    /// Returns the first design file, or an error if there are none.
    pub fn require_design(&self) -> Result<&SourceFile, SourceError> {
        self.design_files()
            .next()
            .ok_or_else(|| SourceError::NoDesignFiles(self.dir.clone()))
    }

    /// Returns the first testbench file, or an error if there are none.
    pub fn require_testbench(&self) -> Result<&SourceFile, SourceError> {
        self.testbench_files()
            .next()
            .ok_or_else(|| SourceError::NoTestbenchFiles(self.dir.clone()))
    }

    /// Returns the top-level file for a hardware workflow under `policy`.
    pub fn require_top(&self, policy: TopPolicy) -> Result<&SourceFile, SourceError> {
        let first_design = self.require_design()?;
        match (self.top_file(), policy) {
            (Some(top), _) => Ok(top),
            (None, TopPolicy::FirstDesign) => {
                log::warn!(
                    "no top-tagged file found, using first design file {}",
                    first_design.file_name()
                );
                Ok(first_design)
            }
            (None, TopPolicy::Explicit) => Err(SourceError::NoTopFile(self.dir.clone())),
        }
    }

    /// The top-tagged file if present, else the first design file.
    ///
    /// Unlike [`require_top`](Self::require_top) this is the normal policy for
    /// simulation, so nothing is logged when the fallback is taken.
    pub fn preferred_design_top(&self) -> Result<&SourceFile, SourceError> {
        match self.top_file() {
            Some(top) => Ok(top),
            None => self.require_design(),
        }
    }
}

/// Lists files in `dir` (non-recursive) with the given extension, sorted by
/// file name.
pub(crate) fn files_with_extension(dir: &Path, ext: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext))
        {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Scans `dir` for Verilog sources and classifies each one.
pub fn classify_dir(dir: &Path) -> Result<ClassifiedSources, SourceError> {
    if !dir.is_dir() {
        return Err(SourceError::MissingDirectory(dir.to_path_buf()));
    }
    let dir = dir
        .canonicalize()
        .map_err(|e| SourceError::io(dir, e))?;
    let files = files_with_extension(&dir, HDL_EXTENSION)
        .map_err(|e| SourceError::io(&dir, e))?
        .into_iter()
        .map(SourceFile::from_path)
        .collect::<Vec<_>>();
    log::debug!("classified {} source file(s) in {}", files.len(), dir.display());
    Ok(ClassifiedSources { dir, files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dir_with(files: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for name in files {
            fs::write(tmp.path().join(name), "module m; endmodule\n").unwrap();
        }
        tmp
    }

    #[test]
    fn testbench_markers() {
        assert_eq!(classify_stem("adder_tb"), SourceRole::Testbench);
        assert_eq!(classify_stem("adder_test"), SourceRole::Testbench);
        assert_eq!(classify_stem("testbench"), SourceRole::Testbench);
        assert_eq!(classify_stem("adder"), SourceRole::Design);
    }

    #[test]
    fn testbench_marker_ignores_case() {
        assert_eq!(classify_stem("adder_TB"), SourceRole::Testbench);
        assert_eq!(classify_stem("adder_Tb"), SourceRole::Testbench);
        assert_eq!(classify_stem("My_TestBench"), SourceRole::Testbench);
    }

    #[test]
    fn top_marker() {
        assert_eq!(classify_stem("blinky_top"), SourceRole::Top);
        assert_eq!(classify_stem("Blinky_TOP"), SourceRole::Top);
        assert!(SourceRole::Top.is_design());
    }

    #[test]
    fn testbench_takes_precedence_over_top() {
        assert_eq!(classify_stem("alu_top_tb"), SourceRole::Testbench);
        assert_eq!(classify_stem("alu_tb_top"), SourceRole::Testbench);
    }

    #[test]
    fn classify_dir_sorts_and_filters() {
        let tmp = dir_with(&["zeta.v", "alpha.v", "alpha_tb.v", "notes.txt", "board.xdc"]);
        fs::create_dir(tmp.path().join("sub.v")).unwrap();
        let sources = classify_dir(tmp.path()).unwrap();
        let names: Vec<_> = sources.files.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["alpha.v", "alpha_tb.v", "zeta.v"]);
        assert_eq!(sources.require_design().unwrap().stem, "alpha");
        assert_eq!(sources.require_testbench().unwrap().stem, "alpha_tb");
    }

    #[test]
    fn classify_dir_is_deterministic() {
        let tmp = dir_with(&["c.v", "b_top.v", "a_tb.v", "d.v"]);
        let first = classify_dir(tmp.path()).unwrap();
        let second = classify_dir(tmp.path()).unwrap();
        assert_eq!(first.files, second.files);
    }

    #[test]
    fn top_is_also_design() {
        let tmp = dir_with(&["b_top.v", "a.v"]);
        let sources = classify_dir(tmp.path()).unwrap();
        assert_eq!(sources.design_files().count(), 2);
        assert_eq!(sources.top_file().unwrap().stem, "b_top");
    }

    #[test]
    fn missing_design_files() {
        let tmp = dir_with(&["only_tb.v"]);
        let sources = classify_dir(tmp.path()).unwrap();
        assert!(matches!(
            sources.require_design(),
            Err(SourceError::NoDesignFiles(_))
        ));
    }

    #[test]
    fn missing_testbench_files() {
        let tmp = dir_with(&["adder.v"]);
        let sources = classify_dir(tmp.path()).unwrap();
        assert!(matches!(
            sources.require_testbench(),
            Err(SourceError::NoTestbenchFiles(_))
        ));
    }

    #[test]
    fn explicit_top_required_by_default() {
        let tmp = dir_with(&["adder.v"]);
        let sources = classify_dir(tmp.path()).unwrap();
        let err = sources.require_top(TopPolicy::default()).unwrap_err();
        assert!(matches!(err, SourceError::NoTopFile(_)));
    }

    #[test]
    fn legacy_policy_falls_back_to_first_design() {
        let tmp = dir_with(&["b.v", "a.v"]);
        let sources = classify_dir(tmp.path()).unwrap();
        let top = sources.require_top(TopPolicy::FirstDesign).unwrap();
        assert_eq!(top.stem, "a");
    }

    #[test]
    fn simulation_top_prefers_tagged_file() {
        let tmp = dir_with(&["alu.v", "cpu_top.v", "cpu_tb.v"]);
        let sources = classify_dir(tmp.path()).unwrap();
        assert_eq!(sources.preferred_design_top().unwrap().stem, "cpu_top");

        let tmp = dir_with(&["mux.v", "adder.v", "adder_tb.v"]);
        let sources = classify_dir(tmp.path()).unwrap();
        assert_eq!(sources.preferred_design_top().unwrap().stem, "adder");
    }

    #[test]
    fn no_design_beats_no_top() {
        let tmp = TempDir::new().unwrap();
        let sources = classify_dir(tmp.path()).unwrap();
        assert!(matches!(
            sources.require_top(TopPolicy::Explicit),
            Err(SourceError::NoDesignFiles(_))
        ));
    }

    #[test]
    fn missing_directory() {
        let tmp = TempDir::new().unwrap();
        let err = classify_dir(&tmp.path().join("absent")).unwrap_err();
        assert!(matches!(err, SourceError::MissingDirectory(_)));
    }
}
