// src/exec/mod.rs

//! Command execution layer.
//!
//! Turns a validated [`PipelineConfig`](crate::config::PipelineConfig) into
//! runner tasks and drives them on a single-threaded Tokio `LocalSet`.
//!
//! - [`backend`] provides the `CommandBackend` trait and the `ShellBackend`
//!   used in production; tests swap in a fake implementation.
//! - [`command`] runs one shell command with `tokio::process`.
//! - [`pipeline`] maps steps onto the sequential runner, and `group` steps
//!   onto a countdown barrier.

pub mod backend;
pub mod command;
pub mod pipeline;

pub use backend::{CommandBackend, ShellBackend};
pub use pipeline::{PipelineOptions, build_tasks, run_pipeline};
