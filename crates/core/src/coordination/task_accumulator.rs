//! Countdown latch for waiting on multiple async processes to finish.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use log::warn;

type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Waits on a fixed number of independent completion signals.
///
/// Each setup step reports in with [`task_completed`](Self::task_completed);
/// the callback supplied at construction runs exactly once, synchronously,
/// on the call that brings the outstanding count to zero. Signals may
/// arrive from unordered async contexts.
pub struct TaskAccumulator {
    remaining: AtomicUsize,
    on_all_done: Mutex<Option<CompletionCallback>>,
}

impl TaskAccumulator {
    /// `count` is the number of completion signals expected. A zero
    /// count runs the callback immediately.
    pub fn new(count: usize, on_all_done: impl FnOnce() + Send + 'static) -> Self {
        let accumulator = Self {
            remaining: AtomicUsize::new(count),
            on_all_done: Mutex::new(Some(Box::new(on_all_done))),
        };
        if count == 0 {
            accumulator.fire();
        }
        accumulator
    }

    /// Registers a task as completed and runs the completion callback if
    /// all tasks are done. Calls beyond the initial count are ignored.
    pub fn task_completed(&self) {
        match self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => self.fire(),
            Ok(_) => {}
            Err(_) => warn!("task accumulator signaled more times than its task count"),
        }
    }

    /// Outstanding task count.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    fn fire(&self) {
        let callback = self.on_all_done.lock().unwrap().take();
        if let Some(callback) = callback {
            callback();
        }
    }
}
