use std::cell::RefCell;
use std::rc::Rc;

/// Shared, cloneable log of values passed to a callback.
///
/// Tests hand `recorder.sink()` to a runner or barrier as its final callback
/// and then assert on `calls()`.
#[derive(Debug)]
pub struct Recorder<T> {
    calls: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Rc::clone(&self.calls),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T: 'static> Recorder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: T) {
        self.calls.borrow_mut().push(value);
    }

    /// A callback that records its argument.
    pub fn sink(&self) -> impl FnOnce(T) + 'static + use<T> {
        let calls = Rc::clone(&self.calls);
        move |value| calls.borrow_mut().push(value)
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }
}

impl<T: Clone> Recorder<T> {
    pub fn calls(&self) -> Vec<T> {
        self.calls.borrow().clone()
    }
}
