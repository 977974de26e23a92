//! Per-device API wrapper
//!
//! [`LandroidApi`] is shared by every entity of one mower. It owns the
//! device worker, detects the feature set once, turns SDK push callbacks
//! into update signals and performs Web API refreshes.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, RwLock, Weak};

use landroid_core::{DeviceSnapshot, LandroidFeatureSupport, DOMAIN};
use tracing::{debug, error, info, warn};

use crate::config::{CloudType, EntryInfo, LandroidConfig};
use crate::dispatcher::{update_signal, Dispatcher};
use crate::entity_id::{slugify, EntityId};
use crate::error::{CloudError, ServiceError};
use crate::fallback::FallbackTimer;
use crate::host::{DeviceInfo, Host};
use crate::sdk::MowerDevice;
use crate::worker::DeviceWorker;

/// Shared handle to one mower
pub struct LandroidApi {
    /// Slug of the device name
    name: String,
    friendly_name: String,
    entry: EntryInfo,
    email: String,
    cloud: CloudType,
    device: Arc<dyn MowerDevice>,
    worker: DeviceWorker,
    host: Arc<dyn Host>,
    dispatcher: Arc<Dispatcher>,
    signal: String,
    features: OnceLock<LandroidFeatureSupport>,
    device_id: OnceLock<String>,
    current_zone: RwLock<Option<i64>>,
    last_online: AtomicBool,
    fallback: FallbackTimer,
}

impl LandroidApi {
    /// Wrap a device handle and install the push callback.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        device: Arc<dyn MowerDevice>,
        entry: EntryInfo,
        config: &LandroidConfig,
        host: Arc<dyn Host>,
        dispatcher: Arc<Dispatcher>,
    ) -> Arc<Self> {
        let snapshot = device.snapshot();
        let worker = DeviceWorker::spawn(snapshot.name.clone(), device.clone());

        let api = Arc::new(Self {
            name: slugify(&snapshot.name),
            signal: update_signal(&snapshot.name),
            friendly_name: snapshot.name.clone(),
            entry,
            email: config.email.clone(),
            cloud: config.cloud,
            device,
            worker,
            host,
            dispatcher,
            features: OnceLock::new(),
            device_id: OnceLock::new(),
            current_zone: RwLock::new(snapshot.zone.as_ref().and_then(|z| z.current)),
            last_online: AtomicBool::new(snapshot.is_online()),
            fallback: FallbackTimer::new(config.fallback_delay()),
        });

        let weak: Weak<Self> = Arc::downgrade(&api);
        api.device.set_callback(Arc::new(move || {
            if let Some(api) = weak.upgrade() {
                api.receive_data();
            }
        }));

        api
    }

    /// Detect the feature set from the base flags and the vendor booleans.
    ///
    /// Only the first call computes anything; later calls return the set
    /// detected for this session.
    pub fn check_features(&self, base: LandroidFeatureSupport) -> LandroidFeatureSupport {
        *self.features.get_or_init(|| {
            let vendor = self.device.snapshot().vendor_capabilities();
            if vendor.partymode_capable {
                debug!(device = %self.name, "Party mode capable");
            }
            if vendor.ots_capable {
                debug!(device = %self.name, "OTS capable");
            }
            if vendor.torque_capable {
                debug!(device = %self.name, "Torque capable");
            }
            LandroidFeatureSupport::detect(base, &vendor)
        })
    }

    /// Detected features, empty until [`check_features`](Self::check_features) ran
    pub fn features(&self) -> LandroidFeatureSupport {
        self.features.get().copied().unwrap_or_default()
    }

    pub fn features_loaded(&self) -> bool {
        self.features.get().is_some()
    }

    /// Push callback from the SDK
    ///
    /// An offline to online transition reloads the config entry so the
    /// entities are rebuilt with the now complete device data.
    pub fn receive_data(&self) {
        let online = self.device.snapshot().is_online();
        let was_online = self.last_online.swap(online, Ordering::SeqCst);
        if online && !was_online {
            info!(device = %self.name, "Device came online, reloading entry");
            self.host.reload_entry(&self.entry.entry_id);
        }

        debug!(device = %self.name, "Received new data from API");
        self.dispatcher.send(&self.signal);
    }

    /// Fetch the device state over the Web API.
    ///
    /// Cloud errors are logged and reported as `false`, never returned.
    pub async fn refresh(&self) -> bool {
        match self.worker.run(|device| device.update()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                self.log_cloud_error(&e);
                false
            }
            Err(e) => {
                error!(device = %self.name, error = %e, "Refresh failed");
                false
            }
        }
    }

    fn log_cloud_error(&self, e: &CloudError) {
        let email = self.email.as_str();
        match e {
            CloudError::Request => error!("Request for {} was malformed.", email),
            CloudError::Authorization => error!(
                "Unauthorized - please check your credentials for {} at Landroid Cloud",
                email
            ),
            CloudError::Forbidden => error!(
                "Server rejected access for {} at Landroid Cloud - this might be temporary due to high numbers of API requests from this IP address.",
                email
            ),
            CloudError::NotFound => error!("Endpoint for {} was not found.", email),
            CloudError::TooManyRequests => error!(
                "Too many requests for {} at Landroid Cloud. IP address temporary banned.",
                email
            ),
            CloudError::InternalServer => error!(
                "Internal server error happened for the request to {} at Landroid Cloud.",
                email
            ),
            CloudError::ServiceUnavailable => error!("Service at Landroid Cloud was unavailable."),
            other => error!(device = %self.name, "{}", other),
        }
    }

    /// Schedule a Web API refresh after the fallback delay.
    ///
    /// Returns `false` when one is already pending.
    pub fn schedule_fallback_refresh(self: &Arc<Self>) -> bool {
        let weak = Arc::downgrade(self);
        self.fallback.schedule(move || async move {
            if let Some(api) = weak.upgrade() {
                info!(device = %api.name, "Starting forced Web API refresh.");
                api.refresh().await;
            }
        })
    }

    pub fn fallback(&self) -> &FallbackTimer {
        &self.fallback
    }

    /// Device registry entry for this mower
    pub fn device_info(&self) -> DeviceInfo {
        let snapshot = self.device.snapshot();
        let product = &snapshot.product;
        let unique_id = self.entry.unique_id.clone().unwrap_or_default();

        DeviceInfo {
            connections: BTreeSet::from([("mac".to_string(), product.mac_address.clone())]),
            identifiers: BTreeSet::from([(
                DOMAIN.to_string(),
                unique_id,
                self.entry.entry_id.clone(),
                product.serial_number.clone(),
            )]),
            name: self.friendly_name.clone(),
            sw_version: snapshot.firmware_version.clone(),
            manufacturer: self.cloud.manufacturer().to_string(),
            model: product.model.clone(),
        }
    }

    /// Remember the device registry id the first time an entity resolves it
    pub fn resolve_device_id(&self, entity_id: &EntityId) -> Option<&str> {
        if self.device_id.get().is_none() {
            match self.host.resolve_device_id(entity_id) {
                Some(id) => {
                    let _ = self.device_id.set(id);
                }
                None => warn!(device = %self.name, entity_id = %entity_id, "Entity has no device"),
            }
        }
        self.device_id()
    }

    pub fn device_id(&self) -> Option<&str> {
        self.device_id.get().map(String::as_str)
    }

    pub fn current_zone(&self) -> Option<i64> {
        *self.current_zone.read().unwrap()
    }

    pub fn set_current_zone(&self, zone: Option<i64>) {
        *self.current_zone.write().unwrap() = zone;
    }

    /// Current device state, read without going through the worker
    pub fn snapshot(&self) -> DeviceSnapshot {
        self.device.snapshot()
    }

    /// Run a closure against the device on the worker
    pub async fn run<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&dyn MowerDevice) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.worker.run(f).await
    }

    pub fn worker(&self) -> &DeviceWorker {
        &self.worker
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn update_signal(&self) -> &str {
        &self.signal
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn entry(&self) -> &EntryInfo {
        &self.entry
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn cloud(&self) -> CloudType {
        self.cloud
    }
}
