// src/runner/next.rs

//! The continuation handed to every task.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use super::cursor::Cursor;
use super::drive;

/// Continuation bound to one [`Runner`](super::Runner) and one task position.
///
/// A task receives exactly one `Next` and must consume it exactly once,
/// through [`call`](Next::call) or one of its shorthands. Calling it with an
/// error finishes the runner with that error; calling it without one moves
/// the runner on to the next task (or finishes it successfully after the
/// last one).
///
/// Dropping a `Next` without calling it leaves the runner stalled forever.
/// That is the task's responsibility; the runner only logs a warning.
pub struct Next<E> {
    cursor: Option<Rc<RefCell<Cursor<E>>>>,
    position: usize,
    task_count: usize,
}

impl<E: 'static> Next<E> {
    pub(crate) fn new(cursor: Rc<RefCell<Cursor<E>>>, position: usize, task_count: usize) -> Self {
        Self {
            cursor: Some(cursor),
            position,
            task_count,
        }
    }

    /// Position of the task this continuation was handed to.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total number of tasks owned by the runner.
    pub fn task_count(&self) -> usize {
        self.task_count
    }

    /// Whether this continuation belongs to the last task in the sequence.
    pub fn is_last(&self) -> bool {
        self.position + 1 == self.task_count
    }

    /// Hand control back to the runner, optionally with an error.
    pub fn call(mut self, error: Option<E>) {
        let Some(cursor) = self.cursor.take() else {
            return;
        };
        let step = cursor.borrow_mut().advance(error);
        drive(&cursor, step);
    }

    /// Shorthand for `call(None)`.
    pub fn done(self) {
        self.call(None);
    }

    /// Shorthand for `call(Some(error))`.
    pub fn fail(self, error: E) {
        self.call(Some(error));
    }

    /// Continue with the error side of `result`, if any.
    pub fn finish(self, result: Result<(), E>) {
        self.call(result.err());
    }
}

impl<E> Drop for Next<E> {
    fn drop(&mut self) {
        let Some(cursor) = self.cursor.take() else {
            return;
        };
        // try_borrow: the drop may happen while the runner is mid-step.
        let terminal = cursor
            .try_borrow()
            .map(|c| c.is_terminal())
            .unwrap_or(false);
        if !terminal {
            warn!(
                position = self.position,
                "continuation dropped without being called; runner is stalled"
            );
        }
    }
}

impl<E> fmt::Debug for Next<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("position", &self.position)
            .field("task_count", &self.task_count)
            .field("consumed", &self.cursor.is_none())
            .finish()
    }
}
