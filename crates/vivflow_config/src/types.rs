//! Configuration types deserialized from `vivflow.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// The default external tool command, resolved through `PATH`.
pub const DEFAULT_TOOL: &str = "vivado";

/// The default behavioral simulation duration.
pub const DEFAULT_SIM_TIME: &str = "1000ns";

/// The default name of the tool-managed project directory.
pub const DEFAULT_PROJECT_DIR: &str = "vivado_project";

/// The top-level configuration parsed from `vivflow.toml`.
///
/// Every section is optional; an empty file yields the same values as
/// [`VivflowConfig::default`].
#[derive(Debug, Default, Deserialize)]
pub struct VivflowConfig {
    /// External tool invocation settings.
    #[serde(default)]
    pub tool: ToolSettings,
    /// Defaults applied when the command line leaves a value unset.
    #[serde(default)]
    pub defaults: Defaults,
    /// Board profiles added to (or overriding) the built-in registry.
    #[serde(default)]
    pub boards: BTreeMap<String, BoardDef>,
}

/// How to locate and supervise the external tool.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// A bare command name resolved through `PATH`, or a path to the executable.
    pub path: String,
    /// Wall-clock limit for one batch invocation, in seconds.
    pub timeout_secs: Option<u64>,
    /// Extra arguments inserted before `-mode` on every invocation.
    pub extra_args: Vec<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_TOOL.to_string(),
            timeout_secs: None,
            extra_args: Vec::new(),
        }
    }
}

impl ToolSettings {
    /// Returns the configured timeout as a [`Duration`], if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Fallback values for per-invocation options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Board used when none is requested, and when the requested one is unknown.
    pub board: String,
    /// Simulation duration passed through to the tool's `run` command.
    pub sim_time: String,
    /// Name of the project directory created inside the source directory.
    pub project_dir: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            board: crate::board::DEFAULT_BOARD.to_string(),
            sim_time: DEFAULT_SIM_TIME.to_string(),
            project_dir: DEFAULT_PROJECT_DIR.to_string(),
        }
    }
}

/// A board entry as written in `vivflow.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardDef {
    /// FPGA part identifier (e.g., "xc7a35tcpg236-1").
    pub part: String,
    /// Board part identifier (e.g., "digilentinc.com:basys3:part0:1.2").
    #[serde(default)]
    pub board_part: Option<String>,
}
