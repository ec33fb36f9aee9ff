//! Coalescing, at-most-one-in-flight writer for a mutable remote
//! document.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, error};
use tokio::sync::oneshot;

use crate::errors::{Error, Result};
use crate::events::{WriteObserver, WriteOutcome};

/// Destination of a debounced write. Domain services implement this over
/// the document store for one logical document.
#[async_trait]
pub trait WriteSink<T>: Send + Sync {
    async fn write(&self, payload: T) -> Result<()>;
}

/// Write-debouncer state for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    /// Store state matches the last requested write. No write in flight.
    Saved,
    /// A write is in flight. No other writes needed.
    Writing,
    /// A write is in flight, and another is needed when it completes
    /// because the document changed after the current write started.
    QueuedWrite,
}

/// Tracks the outcome of the one write a `request_write` call started.
pub struct WriteHandle {
    rx: oneshot::Receiver<Result<()>>,
}

impl WriteHandle {
    /// Resolves when the initiating write round-trips to the store, with
    /// that write's result. Follow-up writes the writer issues on its
    /// own are not reported here.
    pub async fn finished(self) -> Result<()> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::Unexpected(
                "write task dropped before reporting its outcome".to_string(),
            )),
        }
    }
}

/// Serializes writes of one mutable document to the remote store.
///
/// At most one write is outstanding at a time. Requests arriving while a
/// write is in flight are not started; they collapse into a single
/// follow-up write issued when the in-flight one completes, using the
/// supplier's output *at that moment*. Under bursty edit sources the
/// store therefore converges to the most recently requested state with
/// at most two outstanding logical writes (one in flight, one queued).
///
/// Only the caller whose request started a write receives a
/// [`WriteHandle`]; coalesced callers get `None` because their request
/// no longer corresponds 1:1 with a single write. Follow-up write
/// failures are logged and reported to the [`WriteObserver`] only.
pub struct DebouncedWriter<T> {
    inner: Arc<WriterShared<T>>,
}

struct WriterShared<T> {
    state: Mutex<WriteState>,
    pending_writes: AtomicUsize,
    supplier: Box<dyn Fn() -> T + Send + Sync>,
    sink: Arc<dyn WriteSink<T>>,
    observer: Arc<dyn WriteObserver>,
}

impl<T: Send + 'static> DebouncedWriter<T> {
    /// Creates a writer for one logical document. `supplier` must return
    /// the latest full payload to persist each time it is called.
    pub fn new(
        supplier: impl Fn() -> T + Send + Sync + 'static,
        sink: Arc<dyn WriteSink<T>>,
        observer: Arc<dyn WriteObserver>,
    ) -> Self {
        Self {
            inner: Arc::new(WriterShared {
                state: Mutex::new(WriteState::Saved),
                pending_writes: AtomicUsize::new(0),
                supplier: Box::new(supplier),
                sink,
                observer,
            }),
        }
    }

    /// Requests that the current supplier output be written to the
    /// store.
    ///
    /// Returns a [`WriteHandle`] when this call started a write. Returns
    /// `None` when a write was already in flight; the request is then
    /// recorded and satisfied by a future write this component issues on
    /// its own schedule.
    pub fn request_write(&self) -> Option<WriteHandle> {
        {
            let mut state = self.inner.state.lock().unwrap();
            if *state != WriteState::Saved {
                *state = WriteState::QueuedWrite;
                debug!("write in flight; coalescing into a queued follow-up write");
                return None;
            }
            *state = WriteState::Writing;
        }
        self.inner.pending_writes.fetch_add(1, Ordering::AcqRel);
        self.inner.observer.write_started();
        let payload = (self.inner.supplier)();
        let (tx, rx) = oneshot::channel();
        let shared = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut payload = payload;
            // The first iteration's result belongs to the initiating
            // caller; later iterations have nobody to report to.
            let mut reply = Some(tx);
            loop {
                let result = shared.sink.write(payload).await;
                shared.pending_writes.fetch_sub(1, Ordering::AcqRel);
                let outcome = if result.is_ok() {
                    WriteOutcome::Succeeded
                } else {
                    WriteOutcome::Failed
                };
                shared.observer.write_finished(outcome);
                let write_again = {
                    let mut state = shared.state.lock().unwrap();
                    match *state {
                        WriteState::Writing => {
                            *state = WriteState::Saved;
                            false
                        }
                        WriteState::QueuedWrite => {
                            *state = WriteState::Writing;
                            true
                        }
                        WriteState::Saved => {
                            error!("unexpected write state");
                            false
                        }
                    }
                };
                match reply.take() {
                    // Receiver may have been dropped; nothing to do then.
                    Some(tx) => {
                        let _ = tx.send(result);
                    }
                    None => {
                        if let Err(err) = result {
                            error!("follow-up write failed: {err}");
                        }
                    }
                }
                if !write_again {
                    break;
                }
                shared.pending_writes.fetch_add(1, Ordering::AcqRel);
                shared.observer.write_started();
                payload = (shared.supplier)();
            }
        });
        Some(WriteHandle { rx })
    }

    /// Number of writes currently in flight, so callers can warn before
    /// discarding a session and tests can assert quiescence.
    pub fn pending_writes(&self) -> usize {
        self.inner.pending_writes.load(Ordering::Acquire)
    }

    /// Current state of the write state machine.
    pub fn state(&self) -> WriteState {
        *self.inner.state.lock().unwrap()
    }
}
