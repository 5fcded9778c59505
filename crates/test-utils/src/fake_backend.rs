use std::cell::RefCell;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use taskrunner::errors::{Result, TaskrunnerError};
use taskrunner::exec::CommandBackend;

/// A fake backend that:
/// - records every command it was asked to run, in start order
/// - fails commands listed in `failing` with exit code 1
/// - never resolves commands listed in `hanging`
/// - panics on commands listed in `panicking` (dropping the continuation)
/// - yields once before resolving, so group commands interleave.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    started: Rc<RefCell<Vec<String>>>,
    finished: Rc<RefCell<Vec<String>>>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    panicking: HashSet<String>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, cmd: &str) -> Self {
        self.failing.insert(cmd.to_string());
        self
    }

    pub fn hanging(mut self, cmd: &str) -> Self {
        self.hanging.insert(cmd.to_string());
        self
    }

    pub fn panicking(mut self, cmd: &str) -> Self {
        self.panicking.insert(cmd.to_string());
        self
    }

    /// Shared log of commands in the order they were started.
    pub fn started(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.started)
    }

    /// Shared log of commands in the order they finished.
    pub fn finished(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.finished)
    }
}

impl CommandBackend for FakeBackend {
    fn run(&self, step: &str, cmd: &str) -> Pin<Box<dyn Future<Output = Result<()>> + '_>> {
        let step = step.to_string();
        let cmd = cmd.to_string();

        Box::pin(async move {
            self.started.borrow_mut().push(cmd.clone());

            if self.hanging.contains(&cmd) {
                std::future::pending::<()>().await;
            }

            tokio::task::yield_now().await;
            if self.panicking.contains(&cmd) {
                panic!("fake backend: command '{cmd}' panicked");
            }
            self.finished.borrow_mut().push(cmd.clone());

            if self.failing.contains(&cmd) {
                Err(TaskrunnerError::CommandFailed { step, code: 1 })
            } else {
                Ok(())
            }
        })
    }
}
