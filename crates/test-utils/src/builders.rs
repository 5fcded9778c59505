#![allow(dead_code)]

use taskrunner::config::{ConfigSection, PipelineConfig, RawPipelineConfig, StepConfig};
use taskrunner::barrier::BarrierOptions;

/// Builder for `PipelineConfig` to simplify test setup.
pub struct PipelineConfigBuilder {
    config: RawPipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawPipelineConfig {
                config: ConfigSection::default(),
                steps: Vec::new(),
            },
        }
    }

    pub fn with_step(mut self, step: StepConfig) -> Self {
        self.config.steps.push(step);
        self
    }

    pub fn with_cmd(self, name: &str, cmd: &str) -> Self {
        self.with_step(StepConfigBuilder::cmd(name, cmd).build())
    }

    pub fn with_group(self, name: &str, cmds: &[&str]) -> Self {
        self.with_step(StepConfigBuilder::group(name, cmds).build())
    }

    pub fn accumulate_errors(mut self, val: bool) -> Self {
        self.config.config.barrier = BarrierOptions {
            accumulate_errors: val,
        };
        self
    }

    /// The unvalidated model, for validation tests.
    pub fn raw(self) -> RawPipelineConfig {
        self.config
    }

    pub fn build(self) -> PipelineConfig {
        PipelineConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `StepConfig`.
pub struct StepConfigBuilder {
    step: StepConfig,
}

impl StepConfigBuilder {
    pub fn cmd(name: &str, cmd: &str) -> Self {
        Self {
            step: StepConfig {
                name: name.to_string(),
                cmd: Some(cmd.to_string()),
                group: vec![],
                accumulate_errors: None,
            },
        }
    }

    pub fn group(name: &str, cmds: &[&str]) -> Self {
        Self {
            step: StepConfig {
                name: name.to_string(),
                cmd: None,
                group: cmds.iter().map(|c| c.to_string()).collect(),
                accumulate_errors: None,
            },
        }
    }

    pub fn accumulate_errors(mut self, val: bool) -> Self {
        self.step.accumulate_errors = Some(val);
        self
    }

    pub fn build(self) -> StepConfig {
        self.step
    }
}
