//! In-process host that logs what the integration writes

use dashmap::DashMap;
use landroid_cloud::{DeviceInfo, EntityId, EntityState, Host};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Keeps the last state per entity and logs every change
#[derive(Default)]
pub struct LoggingHost {
    states: DashMap<String, EntityState>,
    devices: DashMap<String, DeviceInfo>,
    reloads: Option<mpsc::UnboundedSender<String>>,
}

impl LoggingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward entry reload requests to `tx`
    pub fn with_reloads(mut self, tx: mpsc::UnboundedSender<String>) -> Self {
        self.reloads = Some(tx);
        self
    }

    pub fn state(&self, entity_id: &str) -> Option<EntityState> {
        self.states.get(entity_id).map(|s| s.value().clone())
    }

    /// All entity states, sorted by entity id
    pub fn states(&self) -> Vec<(String, EntityState)> {
        let mut states: Vec<_> = self
            .states
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        states.sort_by(|a, b| a.0.cmp(&b.0));
        states
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

/// Registry id of a device, derived from its identifiers
fn device_id(device: &DeviceInfo) -> String {
    device
        .identifiers
        .iter()
        .next()
        .map(|(domain, _, _, serial)| format!("{}_{}", domain, serial))
        .unwrap_or_else(|| device.name.clone())
}

impl Host for LoggingHost {
    fn write_state(&self, entity_id: &EntityId, state: EntityState) {
        let key = entity_id.to_string();
        let changed = self
            .states
            .get(&key)
            .map_or(true, |old| old.state != state.state || old.available != state.available);
        if changed {
            info!(entity_id = %entity_id, state = %state.state, available = state.available, "State changed");
        } else {
            debug!(entity_id = %entity_id, "Attributes updated");
        }
        self.states.insert(key, state);
    }

    fn resolve_device_id(&self, entity_id: &EntityId) -> Option<String> {
        // a bridge serves a single device
        let id = self.devices.iter().next().map(|e| e.key().clone());
        if id.is_none() {
            warn!(entity_id = %entity_id, "No device registered");
        }
        id
    }

    fn register_device(&self, device: DeviceInfo) -> String {
        let id = device_id(&device);
        info!(
            device_id = %id,
            manufacturer = %device.manufacturer,
            model = %device.model,
            "Registered device {}",
            device.name
        );
        self.devices.insert(id.clone(), device);
        id
    }

    fn reload_entry(&self, entry_id: &str) {
        info!(entry_id, "Reloading entry");
        match &self.reloads {
            Some(tx) if tx.send(entry_id.to_string()).is_ok() => {}
            _ => warn!(entry_id, "Nobody handles entry reloads"),
        }
    }
}
