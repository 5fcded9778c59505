// src/exec/backend.rs

//! Pluggable command backend.
//!
//! The pipeline talks to a `CommandBackend` instead of spawning processes
//! itself, so tests can record which commands ran and decide their outcome
//! without touching the OS.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

use super::command::run_shell_command;

/// Trait abstracting how a single command of a step is executed.
///
/// Futures are polled on a `LocalSet`, so they need not be `Send`.
pub trait CommandBackend {
    /// Run `cmd` on behalf of `step`; resolve to `Err` if it failed.
    fn run(&self, step: &str, cmd: &str) -> Pin<Box<dyn Future<Output = Result<()>> + '_>>;
}

/// Backend that runs each command through the platform shell.
#[derive(Debug, Clone, Default)]
pub struct ShellBackend;

impl CommandBackend for ShellBackend {
    fn run(&self, step: &str, cmd: &str) -> Pin<Box<dyn Future<Output = Result<()>> + '_>> {
        let step = step.to_string();
        let cmd = cmd.to_string();
        Box::pin(async move { run_shell_command(&step, &cmd).await })
    }
}
