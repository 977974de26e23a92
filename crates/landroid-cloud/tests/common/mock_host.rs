//! Recording host

use std::collections::HashMap;
use std::sync::Mutex;

use landroid_cloud::{DeviceInfo, EntityId, EntityState, Host};

/// Device id handed out for every registered device
pub const MOCK_DEVICE_ID: &str = "device-1";

/// A host that keeps every state written to it
pub struct MockHost {
    states: Mutex<HashMap<String, EntityState>>,
    writes: Mutex<Vec<String>>,
    devices: Mutex<Vec<DeviceInfo>>,
    reloads: Mutex<Vec<String>>,
    has_devices: bool,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            devices: Mutex::new(Vec::new()),
            reloads: Mutex::new(Vec::new()),
            has_devices: true,
        }
    }

    /// A host whose registry never resolves entities to a device
    pub fn without_devices(mut self) -> Self {
        self.has_devices = false;
        self
    }

    /// Last state written for an entity
    pub fn state(&self, entity_id: &str) -> Option<EntityState> {
        self.states.lock().unwrap().get(entity_id).cloned()
    }

    /// Number of writes for an entity
    pub fn write_count(&self, entity_id: &str) -> usize {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|id| id.as_str() == entity_id)
            .count()
    }

    pub fn devices(&self) -> Vec<DeviceInfo> {
        self.devices.lock().unwrap().clone()
    }

    pub fn reloads(&self) -> Vec<String> {
        self.reloads.lock().unwrap().clone()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MockHost {
    fn write_state(&self, entity_id: &EntityId, state: EntityState) {
        let id = entity_id.to_string();
        self.writes.lock().unwrap().push(id.clone());
        self.states.lock().unwrap().insert(id, state);
    }

    fn resolve_device_id(&self, _entity_id: &EntityId) -> Option<String> {
        self.has_devices.then(|| MOCK_DEVICE_ID.to_string())
    }

    fn register_device(&self, device: DeviceInfo) -> String {
        self.devices.lock().unwrap().push(device);
        MOCK_DEVICE_ID.to_string()
    }

    fn reload_entry(&self, entry_id: &str) {
        self.reloads.lock().unwrap().push(entry_id.to_string());
    }
}
