//! A promise whose source future is supplied after consumers have
//! already registered interest.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::error;
use tokio::sync::watch;

use crate::errors::Error;

/// Settlement value shared with every waiter. Errors are wrapped in `Arc`
/// so a single failure can settle any number of `wait` calls.
pub type SharedResult<T> = std::result::Result<T, Arc<Error>>;

/// Provides a value that will be produced by a future not yet created.
///
/// Useful when the future you want to wait for will not exist until
/// later: consumers can call [`wait`](Self::wait) before
/// [`set`](Self::set) has been called, and the returned future completes
/// once `set` is called and its argument has settled. Every `wait` call,
/// before or after `set`, observes the same settlement.
pub struct SettablePromise<T> {
    tx: watch::Sender<Option<SharedResult<T>>>,
    assigned: AtomicBool,
}

impl<T: Clone + Send + Sync + 'static> SettablePromise<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx,
            assigned: AtomicBool::new(false),
        }
    }

    /// Binds this promise to `source`. Can only be called once.
    ///
    /// The first call drives `source` to completion on the runtime and
    /// delivers its settlement to all waiters, past and future. Any
    /// later call leaves the existing binding untouched and drops the
    /// new source unpolled; callers may race to initialize a shared
    /// promise, so this is a logged anomaly rather than an error.
    pub fn set<F>(&self, source: F)
    where
        F: Future<Output = crate::errors::Result<T>> + Send + 'static,
    {
        if self.assigned.swap(true, Ordering::AcqRel) {
            error!("promise source already set; dropping the newly supplied source");
            return;
        }
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let settled = source.await.map_err(Arc::new);
            // Waiters may not exist yet; the watch slot holds the value
            // for any that subscribe later.
            tx.send_replace(Some(settled));
        });
    }

    /// Waits for the eventually-bound source to settle, resolving with
    /// the same value or error. Safe to call before [`set`](Self::set).
    pub async fn wait(&self) -> SharedResult<T> {
        let mut rx = self.tx.subscribe();
        let slot = rx
            .wait_for(|slot| slot.is_some())
            .await
            .expect("settable promise sender dropped while a waiter was registered");
        slot.clone().expect("watch slot checked non-empty")
    }
}

impl<T: Clone + Send + Sync + 'static> Default for SettablePromise<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;

    #[tokio::test]
    async fn test_wait_before_set_observes_settlement() {
        let promise: Arc<SettablePromise<u32>> = Arc::new(SettablePromise::new());
        let early = {
            let promise = promise.clone();
            tokio::spawn(async move { promise.wait().await })
        };
        promise.set(async { Ok(42) });
        assert_eq!(early.await.unwrap().unwrap(), 42);
    }

    #[tokio::test]
    async fn test_wait_after_set_observes_settlement() {
        let promise: SettablePromise<u32> = SettablePromise::new();
        promise.set(async { Ok(7) });
        assert_eq!(promise.wait().await.unwrap(), 7);
        // Repeated waits see the same value.
        assert_eq!(promise.wait().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_second_set_is_ignored() {
        let promise: SettablePromise<u32> = SettablePromise::new();
        promise.set(async { Ok(1) });
        promise.set(async { Ok(2) });
        assert_eq!(promise.wait().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejection_propagates_to_all_waiters() {
        let promise: SettablePromise<u32> = SettablePromise::new();
        promise.set(async { Err(Error::Store(StoreError::Connection("offline".into()))) });
        let first = promise.wait().await.unwrap_err();
        let second = promise.wait().await.unwrap_err();
        assert!(matches!(*first, Error::Store(StoreError::Connection(_))));
        // Both waiters share the same settlement.
        assert!(Arc::ptr_eq(&first, &second));
    }
}
