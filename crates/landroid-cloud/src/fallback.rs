//! Web API fallback refresh
//!
//! While the MQTT push channel is down the device state goes stale, so a
//! one-shot Web API refresh is scheduled after a delay. At most one such
//! refresh is pending per device.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// One-shot delayed refresh that never stacks
pub struct FallbackTimer {
    delay: Duration,
    pending: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl FallbackTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Run `refresh` after the delay unless a refresh is already pending.
    ///
    /// Returns whether a new refresh was scheduled. Must be called from
    /// within a tokio runtime.
    pub fn schedule<F, Fut>(&self, refresh: F) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self
            .pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Web API refresh already pending");
            return false;
        }

        let pending = self.pending.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            pending.store(false, Ordering::SeqCst);
            refresh().await;
        });
        *self.handle.lock().unwrap() = Some(handle);
        true
    }

    /// Drop any pending refresh
    pub fn cancel(&self) {
        if let Some(handle) = self.handle.lock().unwrap().take() {
            handle.abort();
        }
        self.pending.store(false, Ordering::SeqCst);
    }
}

impl Drop for FallbackTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
