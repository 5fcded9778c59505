// src/config/model.rs

use serde::Deserialize;

use crate::barrier::BarrierOptions;

/// Pipeline file exactly as read from TOML, before validation.
///
/// ```toml
/// [config]
/// accumulate_errors = false
///
/// [[step]]
/// name = "fmt"
/// cmd = "cargo fmt --check"
///
/// [[step]]
/// name = "tests"
/// group = ["cargo test -p a", "cargo test -p b"]
/// accumulate_errors = true
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPipelineConfig {
    /// Global behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All `[[step]]` entries, in file order.
    #[serde(default, rename = "step")]
    pub steps: Vec<StepConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct ConfigSection {
    /// Default barrier policy for `group` steps.
    #[serde(flatten)]
    pub barrier: BarrierOptions,
}

/// One `[[step]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    pub name: String,

    /// Single shell command. Mutually exclusive with `group`.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Commands started together and joined through a barrier.
    #[serde(default)]
    pub group: Vec<String>,

    /// Per-step override of `[config].accumulate_errors`.
    #[serde(default)]
    pub accumulate_errors: Option<bool>,
}

/// What a validated step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind<'a> {
    Command(&'a str),
    Group(&'a [String]),
}

impl StepConfig {
    pub fn kind(&self) -> StepKind<'_> {
        match self.cmd {
            Some(ref cmd) => StepKind::Command(cmd),
            None => StepKind::Group(&self.group),
        }
    }

    /// Effective barrier options given the pipeline-wide default.
    pub fn barrier_options(&self, default: BarrierOptions) -> BarrierOptions {
        match self.accumulate_errors {
            Some(accumulate_errors) => BarrierOptions { accumulate_errors },
            None => default,
        }
    }
}

/// Validated pipeline. Construct via `TryFrom<RawPipelineConfig>`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    config: ConfigSection,
    steps: Vec<StepConfig>,
}

impl PipelineConfig {
    /// Callers must have validated `steps` (see `config::validate`).
    pub(crate) fn new_unchecked(config: ConfigSection, steps: Vec<StepConfig>) -> Self {
        Self { config, steps }
    }

    pub fn config(&self) -> &ConfigSection {
        &self.config
    }

    /// Steps in execution order; never empty.
    pub fn steps(&self) -> &[StepConfig] {
        &self.steps
    }

    /// Replace the pipeline-wide default barrier policy.
    pub fn with_default_barrier(mut self, barrier: BarrierOptions) -> Self {
        self.config.barrier = barrier;
        self
    }
}
