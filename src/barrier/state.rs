// src/barrier/state.rs

//! Pure countdown state machine.
//!
//! `Waiting(remaining) -> ... -> Terminal`. The completion callback lives
//! inside the `Waiting` state and is moved out on the terminal transition, so
//! it can be invoked at most once. Like the runner cursor, this module never
//! calls user code; it hands a [`Fire`] back to the caller instead.

use std::mem;

use tracing::{debug, trace};

use super::options::Policy;

pub(crate) type FailFastCallback<E> = Box<dyn FnOnce(Option<E>)>;
pub(crate) type AccumulateCallback<E> = Box<dyn FnOnce(Vec<E>)>;

/// Policy-specific part of a waiting barrier.
pub(crate) enum Completion<E> {
    FailFast(FailFastCallback<E>),
    Accumulate {
        callback: AccumulateCallback<E>,
        errors: Vec<E>,
    },
}

impl<E> Completion<E> {
    pub(crate) fn policy(&self) -> Policy {
        match self {
            Completion::FailFast(_) => Policy::FailFast,
            Completion::Accumulate { .. } => Policy::Accumulate,
        }
    }
}

pub(crate) enum BarrierState<E> {
    Waiting {
        remaining: usize,
        completion: Completion<E>,
    },
    Terminal,
}

/// A completion that is ready to be invoked.
pub(crate) enum Fire<E> {
    FailFast(FailFastCallback<E>, Option<E>),
    Accumulate(AccumulateCallback<E>, Vec<E>),
}

impl<E> Fire<E> {
    pub(crate) fn invoke(self) {
        match self {
            Fire::FailFast(callback, error) => callback(error),
            Fire::Accumulate(callback, errors) => callback(errors),
        }
    }
}

/// Result of feeding one signal into the state machine.
pub(crate) enum SignalStep<E> {
    /// Still waiting for `remaining` more signals.
    Pending { remaining: usize },
    /// The barrier just became terminal; the caller must invoke this.
    Fire(Fire<E>),
    /// The barrier was already terminal; the signal had no effect.
    Ignored,
}

impl<E> BarrierState<E> {
    /// `remaining` must be non-zero.
    pub(crate) fn new(remaining: usize, completion: Completion<E>) -> Self {
        BarrierState::Waiting {
            remaining,
            completion,
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        match self {
            BarrierState::Waiting { remaining, .. } => *remaining,
            BarrierState::Terminal => 0,
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        matches!(self, BarrierState::Terminal)
    }

    pub(crate) fn on_signal(&mut self, error: Option<E>) -> SignalStep<E> {
        let BarrierState::Waiting {
            remaining,
            completion,
        } = mem::replace(self, BarrierState::Terminal)
        else {
            trace!("barrier: signal after completion; ignoring");
            return SignalStep::Ignored;
        };

        let remaining = remaining.saturating_sub(1);
        let policy = completion.policy();

        match completion {
            Completion::FailFast(callback) => {
                if error.is_some() || remaining == 0 {
                    debug!(
                        %policy,
                        remaining,
                        failed = error.is_some(),
                        "barrier: completing"
                    );
                    return SignalStep::Fire(Fire::FailFast(callback, error));
                }
                *self = BarrierState::Waiting {
                    remaining,
                    completion: Completion::FailFast(callback),
                };
            }
            Completion::Accumulate {
                callback,
                mut errors,
            } => {
                if let Some(error) = error {
                    errors.push(error);
                }
                if remaining == 0 {
                    debug!(%policy, errors = errors.len(), "barrier: completing");
                    return SignalStep::Fire(Fire::Accumulate(callback, errors));
                }
                *self = BarrierState::Waiting {
                    remaining,
                    completion: Completion::Accumulate { callback, errors },
                };
            }
        }

        SignalStep::Pending { remaining }
    }
}
