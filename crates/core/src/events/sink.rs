//! Write observer trait and implementations.

use std::sync::{Arc, Mutex};

/// Outcome of a single write round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Succeeded,
    Failed,
}

/// A write lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteEvent {
    Started,
    Finished(WriteOutcome),
}

/// Trait for receiving write lifecycle notifications.
///
/// Implementations translate notifications into platform-specific status
/// displays (a saving spinner, a page-unload warning). The debounced
/// writer reports through this trait around every write it issues,
/// including writer-initiated follow-up writes that have no caller to
/// report to.
///
/// # Design Rules
///
/// - Methods must be fast and non-blocking (no network calls, no waits)
/// - Failure to observe must not affect the write being observed
pub trait WriteObserver: Send + Sync {
    /// Called just before a write is issued to the store.
    fn write_started(&self);

    /// Called when a write round trip completes, successfully or not.
    fn write_finished(&self, outcome: WriteOutcome);
}

/// No-op implementation for tests or contexts with no status display.
#[derive(Clone, Default)]
pub struct NoOpWriteObserver;

impl WriteObserver for NoOpWriteObserver {
    fn write_started(&self) {
        // Intentionally empty - notifications are discarded
    }

    fn write_finished(&self, _outcome: WriteOutcome) {
        // Intentionally empty - notifications are discarded
    }
}

/// Mock observer for testing - collects notifications in order.
#[derive(Clone, Default)]
pub struct MockWriteObserver {
    events: Arc<Mutex<Vec<WriteEvent>>>,
}

impl MockWriteObserver {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<WriteEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Clears collected events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Returns the number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Returns true if no events have been collected.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl WriteObserver for MockWriteObserver {
    fn write_started(&self) {
        self.events.lock().unwrap().push(WriteEvent::Started);
    }

    fn write_finished(&self, outcome: WriteOutcome) {
        self.events
            .lock()
            .unwrap()
            .push(WriteEvent::Finished(outcome));
    }
}
