// src/exec/pipeline.rs

//! Map pipeline steps onto the runner and the barrier.
//!
//! Every step becomes one runner task. A `cmd` step spawns its command as a
//! local future and calls the continuation with the result. A `group` step
//! spawns all its commands at once and joins them through a countdown barrier
//! whose completion calls the continuation; the step's policy decides whether
//! the first failure or every failure is reported.
//!
//! Everything runs on one thread inside a `LocalSet`. When a fail-fast group
//! completes early, its remaining commands are left running until the
//! pipeline returns and the `LocalSet` is dropped (which kills them).

use std::num::NonZeroUsize;
use std::rc::Rc;

use tokio::sync::oneshot;
use tokio::task::LocalSet;
use tracing::{error, info, warn};

use crate::barrier::{BarrierOptions, Outcome, Signal};
use crate::config::{PipelineConfig, StepConfig, StepKind};
use crate::errors::{Result, TaskrunnerError};
use crate::runner::{Next, Runner, Task, task};

use super::backend::CommandBackend;

/// Run-time overrides applied on top of the pipeline file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Overrides `[config].accumulate_errors` when set.
    pub accumulate_errors: Option<bool>,
}

/// Run every step of `cfg` in order and report the first step failure.
///
/// Creates its own `LocalSet`, so it must be awaited on a current-thread
/// runtime (or any context where `LocalSet::run_until` is allowed).
pub async fn run_pipeline<B>(
    cfg: &PipelineConfig,
    backend: B,
    options: PipelineOptions,
) -> Result<()>
where
    B: CommandBackend + 'static,
{
    let cfg = match options.accumulate_errors {
        Some(accumulate_errors) => cfg
            .clone()
            .with_default_barrier(BarrierOptions { accumulate_errors }),
        None => cfg.clone(),
    };

    let local = LocalSet::new();
    local
        .run_until(async move {
            let (tx, rx) = oneshot::channel();
            let tasks = build_tasks(&cfg, Rc::new(backend));

            let runner = Runner::new(tasks, move |error| {
                // The receiver only disappears if the caller stopped waiting.
                let _ = tx.send(error);
            })?;

            info!(steps = runner.task_count(), "pipeline: starting");
            runner.start();
            drop(runner);

            match rx.await {
                Ok(None) => {
                    info!("pipeline: all steps succeeded");
                    Ok(())
                }
                Ok(Some(err)) => {
                    error!(error = %err, "pipeline: failed");
                    Err(err)
                }
                Err(_) => {
                    error!("pipeline: final callback dropped before it was called");
                    Err(TaskrunnerError::PipelineStalled)
                }
            }
        })
        .await
}

/// One runner task per step, in file order.
pub fn build_tasks<B>(cfg: &PipelineConfig, backend: Rc<B>) -> Vec<Task<TaskrunnerError>>
where
    B: CommandBackend + 'static,
{
    let default = cfg.config().barrier;
    cfg.steps()
        .iter()
        .map(|step| step_task(step, default, Rc::clone(&backend)))
        .collect()
}

fn step_task<B>(step: &StepConfig, default: BarrierOptions, backend: Rc<B>) -> Task<TaskrunnerError>
where
    B: CommandBackend + 'static,
{
    let name = step.name.clone();
    match step.kind() {
        StepKind::Command(cmd) => {
            let cmd = cmd.to_string();
            task(move |next| command_step(name, cmd, backend, next))
        }
        StepKind::Group(cmds) => {
            let cmds = cmds.to_vec();
            let options = step.barrier_options(default);
            task(move |next| group_step(name, cmds, options, backend, next))
        }
    }
}

fn command_step<B>(name: String, cmd: String, backend: Rc<B>, next: Next<TaskrunnerError>)
where
    B: CommandBackend + 'static,
{
    info!(
        step = %name,
        position = next.position(),
        total = next.task_count(),
        "running step"
    );

    tokio::task::spawn_local(async move {
        let result = backend.run(&name, &cmd).await;
        log_step_result(&name, &result);
        next.finish(result);
    });
}

fn group_step<B>(
    name: String,
    cmds: Vec<String>,
    options: BarrierOptions,
    backend: Rc<B>,
    next: Next<TaskrunnerError>,
) where
    B: CommandBackend + 'static,
{
    let Some(count) = NonZeroUsize::new(cmds.len()) else {
        warn!(step = %name, "group step has no commands; skipping");
        next.done();
        return;
    };

    info!(
        step = %name,
        position = next.position(),
        total = next.task_count(),
        commands = count.get(),
        policy = %options.policy(),
        "running group step"
    );

    let step = name.clone();
    let signal = Signal::with_count(count, options, move |outcome| {
        let result = group_result(&step, outcome);
        log_step_result(&step, &result);
        next.finish(result);
    });

    for cmd in cmds {
        let signal = signal.clone();
        let backend = Rc::clone(&backend);
        let name = name.clone();
        tokio::task::spawn_local(async move {
            let result = backend.run(&name, &cmd).await;
            signal.finish(result);
        });
    }
}

fn group_result(step: &str, outcome: Outcome<TaskrunnerError>) -> Result<()> {
    match outcome {
        Outcome::FailFast(None) => Ok(()),
        Outcome::FailFast(Some(err)) => Err(err),
        Outcome::Accumulated(errors) if errors.is_empty() => Ok(()),
        Outcome::Accumulated(errors) => Err(TaskrunnerError::GroupFailed {
            step: step.to_string(),
            errors,
        }),
    }
}

fn log_step_result(step: &str, result: &Result<()>) {
    match result {
        Ok(()) => info!(step = %step, "step succeeded"),
        Err(err) => warn!(step = %step, error = %err, "step failed"),
    }
}
