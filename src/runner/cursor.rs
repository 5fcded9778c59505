// src/runner/cursor.rs

//! Pure cursor state behind a [`Runner`](super::Runner).
//!
//! The cursor never invokes a task or the final callback itself. Each
//! operation returns a [`CursorStep`] describing what the caller should run
//! next, so the shared state can be released before user code executes
//! (tasks are free to call their continuation re-entrantly).
//!
//! The cursor also records whether a drive loop is active. A step produced
//! while one is running is parked in `pending` and picked up by that loop
//! once the current task returns, so synchronous chains run in constant
//! stack depth.

use tracing::{debug, trace, warn};

use super::{FinalCallback, Task};

/// What the runner shell has to do after a cursor operation.
pub(crate) enum CursorStep<E> {
    /// Run `task`, handing it a continuation bound to `position`.
    Dispatch { position: usize, task: Task<E> },
    /// Invoke the final callback with the given error (or none).
    Finish {
        callback: FinalCallback<E>,
        error: Option<E>,
    },
    /// Nothing to do (already terminal, or `start` called twice).
    Ignored,
}

pub(crate) struct Cursor<E> {
    /// One slot per task; a slot is emptied when its task is dispatched.
    tasks: Vec<Option<Task<E>>>,
    /// Index of the next task to dispatch.
    position: usize,
    started: bool,
    /// `None` once the runner is terminal.
    callback: Option<FinalCallback<E>>,
    /// Set while a drive loop is executing steps.
    driving: bool,
    /// At most one step waits here: only the latest dispatched task holds a
    /// live continuation.
    pending: Option<CursorStep<E>>,
}

impl<E> Cursor<E> {
    pub(crate) fn new(tasks: Vec<Task<E>>, callback: FinalCallback<E>) -> Self {
        Self {
            tasks: tasks.into_iter().map(Some).collect(),
            position: 0,
            started: false,
            callback: Some(callback),
            driving: false,
            pending: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.callback.is_none()
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn start(&mut self) -> CursorStep<E> {
        if self.started {
            warn!(
                position = self.position,
                "runner started more than once; ignoring"
            );
            return CursorStep::Ignored;
        }
        self.started = true;
        debug!(tasks = self.tasks.len(), "runner: starting");
        self.dispatch_current()
    }

    pub(crate) fn advance(&mut self, error: Option<E>) -> CursorStep<E> {
        let Some(callback) = self.callback.take() else {
            warn!(
                position = self.position,
                "continuation invoked after the runner finished; ignoring"
            );
            return CursorStep::Ignored;
        };

        if error.is_some() {
            debug!(
                completed = self.position,
                "runner: task reported an error; short-circuiting"
            );
            return CursorStep::Finish { callback, error };
        }

        if self.position >= self.tasks.len() {
            debug!(completed = self.position, "runner: all tasks completed");
            return CursorStep::Finish {
                callback,
                error: None,
            };
        }

        self.callback = Some(callback);
        self.dispatch_current()
    }

    /// Claim the drive loop for `step`.
    ///
    /// Returns the step if the caller is now the active driver. If a loop is
    /// already running, the step is parked for it and `None` is returned.
    pub(crate) fn enter_drive(&mut self, step: CursorStep<E>) -> Option<CursorStep<E>> {
        if matches!(step, CursorStep::Ignored) {
            return None;
        }
        if self.driving {
            trace!(position = self.position, "runner: deferring step to active drive loop");
            self.pending = Some(step);
            return None;
        }
        self.driving = true;
        Some(step)
    }

    /// Next parked step for the active drive loop.
    pub(crate) fn take_pending(&mut self) -> Option<CursorStep<E>> {
        self.pending.take()
    }

    /// Release the drive loop. Any parked step is dropped.
    pub(crate) fn leave_drive(&mut self) {
        self.driving = false;
        self.pending = None;
    }

    /// Take the task under the cursor and move the cursor past it.
    fn dispatch_current(&mut self) -> CursorStep<E> {
        let position = self.position;
        match self.tasks.get_mut(position).and_then(Option::take) {
            Some(task) => {
                self.position += 1;
                trace!(position, "runner: dispatching task");
                CursorStep::Dispatch { position, task }
            }
            None => {
                warn!(position, "runner: no task at cursor position; ignoring");
                CursorStep::Ignored
            }
        }
    }
}
