//! Module name extraction from Verilog source text.
//!
//! This is a line heuristic, not a parser. Lines are scanned in order with
//! `/* ... */` comments removed, including text that follows a closing `*/`
//! on the same line. Blank lines and `//` lines are skipped. The first
//! remaining line that starts with the `module` keyword yields the identifier
//! that follows it, up to a parenthesis, whitespace, `#`, or semicolon.

use std::path::Path;

use crate::classify::SourceFile;
use crate::error::SourceError;

const MODULE_KEYWORD: &str = "module";

/// Returns the first declared module name in `text`, or `None`.
pub fn extract_module_name(text: &str) -> Option<String> {
    let mut in_block_comment = false;
    for line in text.lines() {
        let mut line = line.trim();
        loop {
            if in_block_comment {
                match line.find("*/") {
                    Some(end) => {
                        in_block_comment = false;
                        line = line[end + 2..].trim_start();
                    }
                    None => line = "",
                }
            }
            match line.strip_prefix("/*") {
                Some(rest) => {
                    in_block_comment = true;
                    line = rest;
                }
                None => break,
            }
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if let Some(name) = declared_name(line) {
            return Some(name);
        }
    }
    None
}

/// Returns the identifier declared by a `module` line, if `line` is one.
fn declared_name(line: &str) -> Option<String> {
    let rest = line.strip_prefix(MODULE_KEYWORD)?;
    // `modules`, `module_x` and similar are identifiers, not the keyword.
    if rest
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        return None;
    }
    let name: String = rest
        .trim_start()
        .chars()
        .take_while(|&c| !(c == '(' || c == ';' || c == '#' || c.is_whitespace()))
        .collect();
    (!name.is_empty()).then_some(name)
}

/// Reads a file and extracts its module name.
///
/// Undecodable bytes are replaced rather than rejected, so the only error is
/// failing to read the file at all.
pub fn module_name_in_file(path: &Path) -> Result<Option<String>, SourceError> {
    let bytes = std::fs::read(path).map_err(|e| SourceError::io(path, e))?;
    Ok(extract_module_name(&String::from_utf8_lossy(&bytes)))
}

/// Extracts the module name of a file that a workflow cannot proceed without.
pub fn require_module_name(file: &SourceFile) -> Result<String, SourceError> {
    module_name_in_file(&file.path)?
        .ok_or_else(|| SourceError::ModuleNameNotFound(file.path.clone()))
}
