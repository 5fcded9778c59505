// src/exec/command.rs

//! Single shell command runner.

use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{Result, TaskrunnerError};

/// Run `cmd` through the platform shell and wait for it to exit.
///
/// - stdout is inherited so command output reaches the terminal unchanged.
/// - stderr is drained line by line into `debug!` logs.
/// - A non-zero exit maps to [`TaskrunnerError::CommandFailed`]; a process
///   killed by a signal reports code `-1`.
pub async fn run_shell_command(step: &str, cmd: &str) -> Result<()> {
    info!(step = %step, cmd = %cmd, "starting command");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for step '{step}'"))?;

    let stderr_drain = child.stderr.take().map(|stderr| {
        let step = step.to_string();
        tokio::task::spawn_local(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(step = %step, "stderr: {}", line);
            }
        })
    });

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of step '{step}'"))?;

    if let Some(handle) = stderr_drain {
        if let Err(err) = handle.await {
            debug!(step = %step, error = %err, "stderr drain task failed; output lines lost");
        }
    }

    let code = status.code().unwrap_or(-1);
    info!(
        step = %step,
        exit_code = code,
        success = status.success(),
        "command exited"
    );

    if status.success() {
        Ok(())
    } else {
        Err(TaskrunnerError::CommandFailed {
            step: step.to_string(),
            code,
        })
    }
}
