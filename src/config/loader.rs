// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{PipelineConfig, RawPipelineConfig};
use crate::errors::Result;

/// Load a pipeline file from a given path and return the raw model.
///
/// This only performs TOML deserialization; it does **not** check step
/// invariants. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawPipelineConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawPipelineConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a pipeline file and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks step names, and that each step is either a `cmd` or a non-empty
///   `group`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let raw = load_from_path(&path)?;
    PipelineConfig::try_from(raw)
}

/// `Taskrunner.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Taskrunner.toml")
}
