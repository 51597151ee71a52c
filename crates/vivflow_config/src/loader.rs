//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::VivflowConfig;
use std::path::Path;

/// File name looked up in a directory when no explicit file is given.
pub const CONFIG_FILE_NAME: &str = "vivflow.toml";

/// Loads and validates a configuration from a file, or from
/// `<dir>/vivflow.toml` when `path` is a directory.
pub fn load_config(path: &Path) -> Result<VivflowConfig, ConfigError> {
    let config_path = if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    if !config_path.is_file() {
        return Err(ConfigError::NotFound(config_path));
    }
    log::debug!("loading configuration from {}", config_path.display());
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<VivflowConfig, ConfigError> {
    let config: VivflowConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Finds the configuration for an invocation.
///
/// An explicit path must exist. Otherwise `<source_dir>/vivflow.toml` is used
/// when present, and the built-in defaults when it is not.
pub fn find_config(
    explicit: Option<&Path>,
    source_dir: &Path,
) -> Result<VivflowConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let candidate = source_dir.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        load_config(&candidate)
    } else {
        log::debug!("no {CONFIG_FILE_NAME} in {}, using defaults", source_dir.display());
        Ok(VivflowConfig::default())
    }
}

/// Validates that configured values are usable.
fn validate_config(config: &VivflowConfig) -> Result<(), ConfigError> {
    if config.tool.path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "tool.path must not be empty".to_string(),
        ));
    }
    if config.tool.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "tool.timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config.defaults.project_dir.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "defaults.project_dir must not be empty".to_string(),
        ));
    }
    for (name, board) in &config.boards {
        if board.part.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "boards.{name}.part must not be empty"
            )));
        }
    }
    Ok(())
}
