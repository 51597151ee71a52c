//! Parsing and validation of `vivflow.toml` tool configuration files.
//!
//! This crate reads the optional configuration file and produces a strongly-typed
//! [`VivflowConfig`] together with the [`BoardRegistry`] used to resolve target
//! boards. A missing configuration file is not an error: built-in defaults apply.

#![warn(missing_docs)]

pub mod board;
pub mod error;
pub mod loader;
pub mod types;

pub use board::{BoardProfile, BoardRegistry, ResolvedBoard, DEFAULT_BOARD};
pub use error::ConfigError;
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
