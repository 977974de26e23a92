//! Single logical worker over the vendor SDK
//!
//! All SDK calls for one device, both commands and refreshes, are queued on
//! one channel and executed on the blocking pool one at a time.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::error::ServiceError;
use crate::sdk::MowerDevice;

/// Default queue depth for pending device jobs
const DEFAULT_QUEUE_CAPACITY: usize = 64;

type Job = Box<dyn FnOnce(&dyn MowerDevice) + Send>;

/// Handle to the worker task of one device
///
/// Cloning the handle shares the same queue, so every clone still sees
/// serialised access to the device.
#[derive(Clone)]
pub struct DeviceWorker {
    tx: mpsc::Sender<Job>,
}

impl DeviceWorker {
    /// Spawn the worker task for a device
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(name: impl Into<String>, device: Arc<dyn MowerDevice>) -> Self {
        Self::with_capacity(name, device, DEFAULT_QUEUE_CAPACITY)
    }

    /// Spawn the worker task with a specific queue depth
    pub fn with_capacity(
        name: impl Into<String>,
        device: Arc<dyn MowerDevice>,
        capacity: usize,
    ) -> Self {
        let name = name.into();
        let (tx, mut rx) = mpsc::channel::<Job>(capacity);

        tokio::spawn(async move {
            debug!(device = %name, "Device worker started");
            while let Some(job) = rx.recv().await {
                let device = device.clone();
                if let Err(e) = tokio::task::spawn_blocking(move || job(device.as_ref())).await {
                    error!(device = %name, error = %e, "Device job panicked");
                }
            }
            debug!(device = %name, "Device worker stopped");
        });

        Self { tx }
    }

    /// Run a closure against the device and wait for its result
    pub async fn run<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&dyn MowerDevice) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let job: Job = Box::new(move |device| {
            let _ = result_tx.send(f(device));
        });

        self.tx.send(job).await.map_err(|_| ServiceError::WorkerGone)?;
        result_rx.await.map_err(|_| ServiceError::WorkerGone)
    }
}
