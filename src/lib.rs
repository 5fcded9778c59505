// src/lib.rs

//! Continuation-driven control flow for single-threaded code.
//!
//! - [`runner`]: a sequential task runner. Each task receives a [`Next`]
//!   continuation and must call it once; the first error short-circuits to
//!   the final callback.
//! - [`barrier`]: a countdown barrier that fires its callback after a fixed
//!   number of signals, failing fast or accumulating errors.
//!
//! The [`exec`] module and the `taskrunner` binary build a small command
//! pipeline on top of both.

pub mod barrier;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod runner;

pub use barrier::{BarrierOptions, Outcome, Policy, Signal, make_barrier};
pub use errors::{Result, TaskrunnerError};
pub use runner::{Next, Runner, Task, task};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{PipelineConfig, StepKind, default_config_path, load_and_validate};
use crate::exec::{PipelineOptions, ShellBackend, run_pipeline};

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the pipeline file, then either prints it
/// (`--dry-run`) or runs it with the shell backend.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.unwrap_or_else(default_config_path);
    debug!(path = %config_path.display(), "loading pipeline file");
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let options = PipelineOptions {
        accumulate_errors: args.accumulate_errors.then_some(true),
    };

    run_pipeline(&cfg, ShellBackend, options).await
}

/// Simple dry-run output: print steps and their commands.
fn print_dry_run(cfg: &PipelineConfig) {
    let default = cfg.config().barrier;

    println!("taskrunner dry-run");
    println!(
        "  config.accumulate_errors = {}",
        default.accumulate_errors
    );
    println!();

    println!("steps ({}):", cfg.steps().len());
    for (idx, step) in cfg.steps().iter().enumerate() {
        println!("  {}. {}", idx + 1, step.name);
        match step.kind() {
            StepKind::Command(cmd) => println!("      cmd: {cmd}"),
            StepKind::Group(cmds) => {
                println!("      group ({}):", step.barrier_options(default).policy());
                for cmd in cmds {
                    println!("        - {cmd}");
                }
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
