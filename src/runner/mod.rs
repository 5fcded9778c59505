// src/runner/mod.rs

//! Sequential task runner.
//!
//! A [`Runner`] owns an ordered list of continuation-passing tasks and a final
//! callback. [`Runner::start`] dispatches the first task; every task gets a
//! [`Next`] continuation and must call it exactly once to let the runner
//! proceed:
//!
//! - with an error: the final callback receives that error and no further
//!   task runs;
//! - without one: the next task is dispatched, or, after the last task, the
//!   final callback is invoked with `None`.
//!
//! Continuations called synchronously from inside a task do not nest: the
//! next task starts after the calling task returns, so arbitrarily long
//! chains of immediate continuations use constant stack.
//!
//! The final callback fires exactly once per runner. Tasks are free to do
//! asynchronous work (e.g. spawn a local future) before calling their
//! continuation; the runner only cares about the order of continuation calls.
//!
//! - [`cursor`] holds the pure position/slot bookkeeping.
//! - [`next`] defines the continuation handle.

mod cursor;
mod next;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::errors::{Result, TaskrunnerError};

use cursor::{Cursor, CursorStep};
pub use next::Next;

/// A unit of work driven by a [`Runner`].
pub type Task<E> = Box<dyn FnOnce(Next<E>)>;

pub(crate) type FinalCallback<E> = Box<dyn FnOnce(Option<E>)>;

/// Box a closure into a [`Task`].
pub fn task<E, F>(f: F) -> Task<E>
where
    F: FnOnce(Next<E>) + 'static,
{
    Box::new(f)
}

/// Drives a fixed sequence of tasks one at a time.
pub struct Runner<E> {
    cursor: Rc<RefCell<Cursor<E>>>,
}

impl<E: 'static> Runner<E> {
    /// Create a runner over `tasks`.
    ///
    /// Fails with [`TaskrunnerError::InvalidArgument`] if `tasks` is empty,
    /// in which case nothing runs and `callback` is dropped uncalled.
    pub fn new<F>(tasks: Vec<Task<E>>, callback: F) -> Result<Self>
    where
        F: FnOnce(Option<E>) + 'static,
    {
        if tasks.is_empty() {
            return Err(TaskrunnerError::InvalidArgument(
                "runner needs at least one task (position 0 must exist)".to_string(),
            ));
        }

        debug!(tasks = tasks.len(), "runner: created");

        Ok(Self {
            cursor: Rc::new(RefCell::new(Cursor::new(tasks, Box::new(callback)))),
        })
    }

    /// Like [`Runner::new`], boxing each closure of `tasks`.
    pub fn from_tasks<I, T, F>(tasks: I, callback: F) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: FnOnce(Next<E>) + 'static,
        F: FnOnce(Option<E>) + 'static,
    {
        let tasks = tasks.into_iter().map(task).collect();
        Self::new(tasks, callback)
    }

    /// Dispatch the task at position 0.
    ///
    /// Everything after that is driven by the tasks' continuations. Must be
    /// called at most once; later calls are ignored.
    pub fn start(&self) {
        let step = self.cursor.borrow_mut().start();
        drive(&self.cursor, step);
    }

    /// Number of tasks owned by this runner.
    pub fn task_count(&self) -> usize {
        self.cursor.borrow().len()
    }

    /// Number of tasks dispatched so far.
    pub fn dispatched(&self) -> usize {
        self.cursor.borrow().position()
    }

    /// Whether the final callback has already been invoked.
    pub fn is_finished(&self) -> bool {
        self.cursor.borrow().is_terminal()
    }
}

impl<E> fmt::Debug for Runner<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cursor.try_borrow() {
            Ok(cursor) => f
                .debug_struct("Runner")
                .field("tasks", &cursor.len())
                .field("position", &cursor.position())
                .field("finished", &cursor.is_terminal())
                .finish(),
            Err(_) => f.debug_struct("Runner").finish_non_exhaustive(),
        }
    }
}

/// Execute `step` and every step it causes.
///
/// The outermost call owns the loop. A continuation called from inside a
/// running task only parks its step on the cursor and returns; the loop
/// picks it up after the task returns. The cursor must not be borrowed here.
fn drive<E: 'static>(cursor: &Rc<RefCell<Cursor<E>>>, step: CursorStep<E>) {
    let Some(mut step) = cursor.borrow_mut().enter_drive(step) else {
        return;
    };
    let _guard = DriveGuard(cursor.as_ref());

    loop {
        run_step(cursor, step);
        let Some(pending) = cursor.borrow_mut().take_pending() else {
            break;
        };
        step = pending;
    }
}

fn run_step<E: 'static>(cursor: &Rc<RefCell<Cursor<E>>>, step: CursorStep<E>) {
    match step {
        CursorStep::Dispatch { position, task } => {
            let task_count = cursor.borrow().len();
            task(Next::new(Rc::clone(cursor), position, task_count));
        }
        CursorStep::Finish { callback, error } => {
            debug!(failed = error.is_some(), "runner: invoking final callback");
            callback(error);
        }
        CursorStep::Ignored => {}
    }
}

/// Releases the drive loop on exit, including when a task panics.
struct DriveGuard<'a, E>(&'a RefCell<Cursor<E>>);

impl<E> Drop for DriveGuard<'_, E> {
    fn drop(&mut self) {
        if let Ok(mut cursor) = self.0.try_borrow_mut() {
            cursor.leave_drive();
        }
    }
}
