// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskrunnerError {
    /// Construction-time contract violation (empty task list, zero count).
    ///
    /// Always returned synchronously, never delivered through a callback.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("step '{step}' failed with exit code {code}")]
    CommandFailed { step: String, code: i32 },

    #[error("step '{step}': {} command(s) failed", .errors.len())]
    GroupFailed {
        step: String,
        errors: Vec<TaskrunnerError>,
    },

    #[error("pipeline stalled: a step dropped its continuation without calling it")]
    PipelineStalled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskrunnerError>;
