// src/barrier/mod.rs

//! Countdown barrier.
//!
//! A barrier is created with a target count and a completion callback and
//! hands back a cloneable [`Signal`]. Every independent piece of work calls
//! [`Signal::signal`] once when it is done, optionally with an error. The
//! callback fires exactly once:
//!
//! - [`Policy::FailFast`]: on the first signal carrying an error, or on the
//!   `count`-th signal with whatever error that last signal carried. Signals
//!   after that are no-ops.
//! - [`Policy::Accumulate`]: on the `count`-th signal, with every error seen
//!   so far in call order (possibly none).
//!
//! A barrier that never receives its full count never fires. There is no
//! timeout.

mod options;
mod state;

use std::cell::RefCell;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::errors::{Result, TaskrunnerError};

pub use options::{BarrierOptions, Policy};
use state::{BarrierState, Completion, SignalStep};

/// What a barrier created through [`make_barrier`] reports on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<E> {
    /// Fail-fast completion: the first error, or the last signal's error.
    FailFast(Option<E>),
    /// Accumulate completion: every error, in signal order.
    Accumulated(Vec<E>),
}

impl<E> Outcome<E> {
    /// `true` if no error was reported.
    pub fn is_success(&self) -> bool {
        match self {
            Outcome::FailFast(error) => error.is_none(),
            Outcome::Accumulated(errors) => errors.is_empty(),
        }
    }

    /// All reported errors, regardless of policy.
    pub fn into_errors(self) -> Vec<E> {
        match self {
            Outcome::FailFast(error) => error.into_iter().collect(),
            Outcome::Accumulated(errors) => errors,
        }
    }
}

/// Create a barrier that expects `count` signals.
///
/// `options` selects the policy; `callback` receives the matching
/// [`Outcome`] variant. Fails with [`TaskrunnerError::InvalidArgument`] when
/// `count` is zero.
pub fn make_barrier<E, F>(count: usize, options: BarrierOptions, callback: F) -> Result<Signal<E>>
where
    E: 'static,
    F: FnOnce(Outcome<E>) + 'static,
{
    Ok(Signal::with_count(non_zero(count)?, options, callback))
}

fn non_zero(count: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(count).ok_or_else(|| {
        TaskrunnerError::InvalidArgument("barrier count must be a positive integer".to_string())
    })
}

/// Handle used to signal a barrier.
///
/// Clones share the same barrier state.
pub struct Signal<E> {
    state: Rc<RefCell<BarrierState<E>>>,
    policy: Policy,
    count: usize,
}

impl<E: 'static> Signal<E> {
    /// Fail-fast barrier whose callback receives `Option<E>`.
    pub fn fail_fast<F>(count: usize, callback: F) -> Result<Self>
    where
        F: FnOnce(Option<E>) + 'static,
    {
        Ok(Self::fail_fast_with_count(non_zero(count)?, callback))
    }

    /// Accumulating barrier whose callback receives `Vec<E>`.
    pub fn accumulate<F>(count: usize, callback: F) -> Result<Self>
    where
        F: FnOnce(Vec<E>) + 'static,
    {
        Ok(Self::accumulate_with_count(non_zero(count)?, callback))
    }

    pub fn fail_fast_with_count<F>(count: NonZeroUsize, callback: F) -> Self
    where
        F: FnOnce(Option<E>) + 'static,
    {
        Self::from_completion(count, Completion::FailFast(Box::new(callback)))
    }

    pub fn accumulate_with_count<F>(count: NonZeroUsize, callback: F) -> Self
    where
        F: FnOnce(Vec<E>) + 'static,
    {
        Self::from_completion(
            count,
            Completion::Accumulate {
                callback: Box::new(callback),
                errors: Vec::new(),
            },
        )
    }

    /// Infallible form of [`make_barrier`].
    pub fn with_count<F>(count: NonZeroUsize, options: BarrierOptions, callback: F) -> Self
    where
        F: FnOnce(Outcome<E>) + 'static,
    {
        match options.policy() {
            Policy::FailFast => Self::fail_fast_with_count(count, move |error| {
                callback(Outcome::FailFast(error))
            }),
            Policy::Accumulate => Self::accumulate_with_count(count, move |errors| {
                callback(Outcome::Accumulated(errors))
            }),
        }
    }

    fn from_completion(count: NonZeroUsize, completion: Completion<E>) -> Self {
        let policy = completion.policy();
        debug!(count = count.get(), %policy, "barrier: created");

        Self {
            state: Rc::new(RefCell::new(BarrierState::new(count.get(), completion))),
            policy,
            count: count.get(),
        }
    }

    /// Record one completion, optionally carrying an error.
    ///
    /// Invokes the callback if this signal completes the barrier. A no-op once
    /// the barrier is terminal.
    pub fn signal(&self, error: Option<E>) {
        let step = self.state.borrow_mut().on_signal(error);
        match step {
            SignalStep::Fire(fire) => fire.invoke(),
            SignalStep::Pending { remaining } => {
                trace!(policy = %self.policy, remaining, "barrier: waiting for more signals");
            }
            SignalStep::Ignored => {}
        }
    }

    /// Shorthand for `signal(None)`.
    pub fn done(&self) {
        self.signal(None);
    }

    /// Shorthand for `signal(Some(error))`.
    pub fn fail(&self, error: E) {
        self.signal(Some(error));
    }

    /// Signal with the error side of `result`, if any.
    pub fn finish(&self, result: std::result::Result<(), E>) {
        self.signal(result.err());
    }
}

impl<E> Signal<E> {
    /// Signals still required before the callback fires (0 once terminal).
    pub fn remaining(&self) -> usize {
        self.state.borrow().remaining()
    }

    /// Whether the callback has fired.
    pub fn is_terminal(&self) -> bool {
        self.state.borrow().is_terminal()
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// The count this barrier was created with.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl<E> Clone for Signal<E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            policy: self.policy,
            count: self.count,
        }
    }
}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Signal");
        s.field("policy", &self.policy).field("count", &self.count);
        match self.state.try_borrow() {
            Ok(state) => s.field("remaining", &state.remaining()).finish(),
            Err(_) => s.finish_non_exhaustive(),
        }
    }
}
