//! Startup authentication orchestration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, warn};

use super::auth_traits::{GeoAuthProvider, StoreAuthProvider, StoreUser};
use crate::coordination::{SettablePromise, SharedResult, TaskAccumulator};

/// Runs the document-store and analysis-backend sign-in flows.
///
/// Consumers that need "signed into the document store" can await
/// [`store_user`](Self::store_user) before [`start`](Self::start) has
/// even run; the promise settles once the flow completes. The analysis
/// backend reports readiness by counting down the startup accumulator
/// instead, because its consumers only care that initialization finished
/// before the application enables itself.
pub struct Authenticator {
    store_auth: Arc<dyn StoreAuthProvider>,
    geo_auth: Arc<dyn GeoAuthProvider>,
    store_sign_in: SettablePromise<StoreUser>,
    started: AtomicBool,
}

impl Authenticator {
    pub fn new(store_auth: Arc<dyn StoreAuthProvider>, geo_auth: Arc<dyn GeoAuthProvider>) -> Self {
        Self {
            store_auth,
            geo_auth,
            store_sign_in: SettablePromise::new(),
            started: AtomicBool::new(false),
        }
    }

    /// The signed-in store user. Safe to await before `start`.
    pub async fn store_user(&self) -> SharedResult<StoreUser> {
        self.store_sign_in.wait().await
    }

    /// Kicks off both sign-in flows. `startup` is counted down once the
    /// analysis backend has initialized. Calling this more than once is
    /// ignored.
    pub fn start(&self, startup: Arc<TaskAccumulator>) {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!("authentication already started");
            return;
        }
        let geo_auth = self.geo_auth.clone();
        tokio::spawn(async move {
            match geo_auth.initialize().await {
                Ok(()) => startup.task_completed(),
                Err(err) => error!("analysis backend initialization failed: {err}"),
            }
        });
        let store_auth = self.store_auth.clone();
        self.store_sign_in
            .set(async move { store_auth.sign_in().await });
    }
}
