//! Shared entity core
//!
//! Every Landroid entity owns an [`EntityCore`]: its ids, a handle to the
//! device API and the data derived on each refresh.

use std::sync::{Arc, RwLock};

use landroid_core::{attributes, status, Attributes, DeviceSnapshot, MowerState, DOMAIN};
use tracing::{debug, warn};

use crate::api::LandroidApi;
use crate::entity_id::{EntityId, EntityIdError};
use crate::host::EntityState;

/// Data derived from the device on each refresh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreData {
    pub attributes: Attributes,
    pub state: MowerState,
    pub available: bool,
    pub battery_level: Option<i64>,
}

pub struct EntityCore {
    api: Arc<LandroidApi>,
    entity_id: EntityId,
    unique_id: String,
    name: String,
    device_class: String,
    data: RwLock<CoreData>,
}

impl EntityCore {
    /// Core of the main mower entity
    pub fn mower(api: Arc<LandroidApi>, domain: &str) -> Result<Self, EntityIdError> {
        let serial = api.snapshot().product.serial_number;
        Ok(Self {
            entity_id: EntityId::new(domain, api.name())?,
            unique_id: format!("{}_{}", serial, api.name()),
            name: api.friendly_name().to_string(),
            device_class: format!("{}__state", DOMAIN),
            data: RwLock::new(CoreData::default()),
            api,
        })
    }

    /// Core of an auxiliary entity identified by `key`, e.g. a button
    pub fn keyed(api: Arc<LandroidApi>, domain: &str, key: &str) -> Result<Self, EntityIdError> {
        Ok(Self {
            entity_id: EntityId::from_name(domain, &format!("{} {}", api.name(), key))?,
            unique_id: format!("{}_{}_{}", api.name(), domain, key),
            name: format!("{} {}", api.friendly_name(), key),
            device_class: format!("{}__{}_{}", DOMAIN, domain, key),
            data: RwLock::new(CoreData::default()),
            api,
        })
    }

    /// Refresh the derived data from the device.
    ///
    /// Returns the snapshot the data was derived from. When the MQTT channel
    /// is down a Web API refresh is scheduled on the device.
    pub fn data_update(&self) -> DeviceSnapshot {
        debug!(entity_id = %self.entity_id, "Updating");
        let snapshot = self.api.snapshot();
        let online = snapshot.is_online();
        let error = snapshot.error.id;

        {
            let mut data = self.data.write().unwrap();
            attributes::merge_into(&mut data.attributes, attributes::extract(&snapshot), &snapshot);
            data.available = status::is_available(online, error);
            data.state = status::classify(online, error, snapshot.status.id);
            if let Some(percent) = snapshot.battery_percent() {
                data.battery_level = Some(percent);
            }
            debug!(entity_id = %self.entity_id, online, state = %data.state, "State updated");
            debug!(entity_id = %self.entity_id, attributes = ?data.attributes, "Attributes");
        }

        if let Some(current) = snapshot.zone.as_ref().and_then(|z| z.current) {
            self.api.set_current_zone(Some(current));
        }

        if !snapshot.mqtt_connected && self.api.schedule_fallback_refresh() {
            warn!(
                entity_id = %self.entity_id,
                "MQTT connection is offline, scheduling Web API refresh in {} minutes.",
                self.api.fallback().delay().as_secs() / 60
            );
        }

        snapshot
    }

    /// Resolve the device registry id this entity is attached to
    pub fn added_to_host(&self) {
        self.api.resolve_device_id(&self.entity_id);
    }

    /// Write a state for this entity to the host
    pub fn write_state(&self, state: EntityState) {
        self.api.host().write_state(&self.entity_id, state);
    }

    pub fn data(&self) -> CoreData {
        self.data.read().unwrap().clone()
    }

    pub fn state(&self) -> MowerState {
        self.data.read().unwrap().state
    }

    pub fn api(&self) -> &Arc<LandroidApi> {
        &self.api
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_class(&self) -> &str {
        &self.device_class
    }
}
