// src/barrier/options.rs

use std::fmt;

use serde::Deserialize;

/// How a barrier reacts to signals that carry an error.
///
/// - `FailFast`: the first error completes the barrier immediately; later
///   signals are ignored (default).
/// - `Accumulate`: errors are collected in call order and reported together
///   once every signal has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    #[default]
    FailFast,
    Accumulate,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::FailFast => f.write_str("fail_fast"),
            Policy::Accumulate => f.write_str("accumulate"),
        }
    }
}

/// Options accepted by [`make_barrier`](super::make_barrier).
///
/// Deserializes from the same shape used in pipeline files:
///
/// ```toml
/// accumulate_errors = true
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct BarrierOptions {
    /// Collect every error instead of failing on the first one.
    #[serde(default)]
    pub accumulate_errors: bool,
}

impl BarrierOptions {
    pub fn accumulate() -> Self {
        Self {
            accumulate_errors: true,
        }
    }

    pub fn policy(&self) -> Policy {
        if self.accumulate_errors {
            Policy::Accumulate
        } else {
            Policy::FailFast
        }
    }
}

impl From<Policy> for BarrierOptions {
    fn from(policy: Policy) -> Self {
        Self {
            accumulate_errors: policy == Policy::Accumulate,
        }
    }
}
