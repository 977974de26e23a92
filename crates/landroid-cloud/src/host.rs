//! Host platform seam
//!
//! The integration never owns the state machine or the registries. It
//! writes entity state through [`Host`] and asks the host to register
//! devices and reload config entries.

use std::collections::BTreeSet;

use landroid_core::Attributes;
use serde::Serialize;

use crate::entity_id::EntityId;

/// State written for one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub state: String,
    pub attributes: Attributes,
    pub available: bool,
}

impl EntityState {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            attributes: Attributes::new(),
            available: true,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }
}

/// Device registry entry for a mower
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// `(connection type, value)` pairs, e.g. `("mac", "aa:bb:...")`
    pub connections: BTreeSet<(String, String)>,
    /// `(domain, unique id, entry id, serial number)`
    pub identifiers: BTreeSet<(String, String, String, String)>,
    pub name: String,
    pub sw_version: Option<String>,
    pub manufacturer: String,
    pub model: String,
}

/// Operations the integration needs from the host platform
pub trait Host: Send + Sync + 'static {
    /// Write the current state of an entity
    fn write_state(&self, entity_id: &EntityId, state: EntityState);

    /// Device registry id the entity was attached to, if registered
    fn resolve_device_id(&self, entity_id: &EntityId) -> Option<String>;

    /// Register a device (or update an existing one) and return its id
    fn register_device(&self, device: DeviceInfo) -> String;

    /// Schedule a reload of a config entry
    fn reload_entry(&self, entry_id: &str);
}
