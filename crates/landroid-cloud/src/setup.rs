//! Wiring a device into the host
//!
//! [`setup_device`] builds the API wrapper, detects features, resolves the
//! service table, registers the device and its entities, and connects each
//! entity to the device's update signal.

use std::sync::Arc;

use landroid_core::LandroidFeatureSupport;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::LandroidApi;
use crate::config::{ConfigError, EntryInfo, LandroidConfig};
use crate::dispatcher::Dispatcher;
use crate::entity::{ButtonKind, LandroidButton, LandroidEntity, MowerEntity, ZoneSelect};
use crate::entity_id::EntityIdError;
use crate::host::Host;
use crate::sdk::MowerDevice;
use crate::services::ServiceTable;

/// Errors that abort setting up a device
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot derive entity id from device name: {0}")]
    EntityId(#[from] EntityIdError),
}

/// A device and its entities, live in the host
pub struct LandroidDevice {
    pub api: Arc<LandroidApi>,
    pub services: Arc<ServiceTable>,
    pub mower: Arc<MowerEntity>,
    pub zone_select: Option<Arc<ZoneSelect>>,
    pub buttons: Vec<Arc<LandroidButton>>,
    listeners: Vec<JoinHandle<()>>,
}

impl LandroidDevice {
    /// Every entity of this device
    pub fn entities(&self) -> Vec<Arc<dyn LandroidEntity>> {
        let mut entities: Vec<Arc<dyn LandroidEntity>> =
            vec![self.mower.clone() as Arc<dyn LandroidEntity>];
        if let Some(select) = &self.zone_select {
            entities.push(select.clone());
        }
        entities.extend(
            self.buttons
                .iter()
                .map(|b| b.clone() as Arc<dyn LandroidEntity>),
        );
        entities
    }

    pub fn button(&self, kind: ButtonKind) -> Option<&Arc<LandroidButton>> {
        self.buttons.iter().find(|b| b.kind() == kind)
    }

    /// Disconnect the entities and drop any pending refresh
    pub fn unload(&self) {
        for listener in &self.listeners {
            listener.abort();
        }
        self.api.fallback().cancel();
        info!(device = %self.api.name(), "Device unloaded");
    }
}

impl Drop for LandroidDevice {
    fn drop(&mut self) {
        for listener in &self.listeners {
            listener.abort();
        }
    }
}

/// Set up one mower.
///
/// Must be called from within a tokio runtime.
pub fn setup_device(
    device: Arc<dyn MowerDevice>,
    entry: EntryInfo,
    config: &LandroidConfig,
    host: Arc<dyn Host>,
    dispatcher: Arc<Dispatcher>,
) -> Result<LandroidDevice, SetupError> {
    let base = config.base_features()?;
    let api = LandroidApi::new(device, entry, config, host.clone(), dispatcher);
    let features = api.check_features(base);

    let services = Arc::new(ServiceTable::from_features(api.clone()));
    let device_id = host.register_device(api.device_info());
    debug!(device = %api.name(), device_id = %device_id, "Device registered");

    let mower = Arc::new(MowerEntity::new(api.clone(), services.clone())?);
    let zone_select = if features.contains(LandroidFeatureSupport::SETZONE) {
        Some(Arc::new(ZoneSelect::new(api.clone(), services.clone())?))
    } else {
        None
    };
    let buttons = ButtonKind::enabled_by(features)
        .into_iter()
        .map(|kind| LandroidButton::new(api.clone(), services.clone(), kind).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;

    let mut landroid = LandroidDevice {
        api,
        services,
        mower,
        zone_select,
        buttons,
        listeners: Vec::new(),
    };

    for entity in landroid.entities() {
        entity.added_to_host();
        landroid.listeners.push(connect(&landroid.api, entity));
    }

    info!(
        device = %landroid.api.name(),
        services = ?landroid.services.operations(),
        "Landroid Cloud device set up"
    );
    Ok(landroid)
}

/// Run the entity's update callback every time the device signals new data
fn connect(api: &LandroidApi, entity: Arc<dyn LandroidEntity>) -> JoinHandle<()> {
    let mut rx = api.dispatcher().connect(api.update_signal());
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(()) => entity.update_callback(),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(entity_id = %entity.entity_id(), skipped, "Missed update signals");
                    entity.update_callback();
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
