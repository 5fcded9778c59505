// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{PipelineConfig, RawPipelineConfig, StepConfig};
use crate::errors::{Result, TaskrunnerError};

impl TryFrom<RawPipelineConfig> for PipelineConfig {
    type Error = TaskrunnerError;

    fn try_from(raw: RawPipelineConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(PipelineConfig::new_unchecked(raw.config, raw.steps))
    }
}

fn validate_raw_config(cfg: &RawPipelineConfig) -> Result<()> {
    ensure_has_steps(cfg)?;
    validate_step_names(cfg)?;
    for step in cfg.steps.iter() {
        validate_step_body(step)?;
    }
    Ok(())
}

fn ensure_has_steps(cfg: &RawPipelineConfig) -> Result<()> {
    if cfg.steps.is_empty() {
        return Err(TaskrunnerError::ConfigError(
            "pipeline must contain at least one [[step]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_step_names(cfg: &RawPipelineConfig) -> Result<()> {
    let mut seen = HashSet::new();
    for (idx, step) in cfg.steps.iter().enumerate() {
        if step.name.trim().is_empty() {
            return Err(TaskrunnerError::ConfigError(format!(
                "step #{} has an empty name",
                idx + 1
            )));
        }
        if !seen.insert(step.name.as_str()) {
            return Err(TaskrunnerError::ConfigError(format!(
                "duplicate step name '{}'",
                step.name
            )));
        }
    }
    Ok(())
}

fn validate_step_body(step: &StepConfig) -> Result<()> {
    match (&step.cmd, step.group.is_empty()) {
        (Some(_), false) => Err(TaskrunnerError::ConfigError(format!(
            "step '{}' sets both `cmd` and `group`",
            step.name
        ))),
        (None, true) => Err(TaskrunnerError::ConfigError(format!(
            "step '{}' needs either `cmd` or a non-empty `group`",
            step.name
        ))),
        (Some(cmd), true) if cmd.trim().is_empty() => Err(TaskrunnerError::ConfigError(
            format!("step '{}' has an empty `cmd`", step.name),
        )),
        (None, false) if step.group.iter().any(|c| c.trim().is_empty()) => {
            Err(TaskrunnerError::ConfigError(format!(
                "step '{}' has an empty command in `group`",
                step.name
            )))
        }
        _ => Ok(()),
    }
}
