//! Zone selector

use std::sync::{Arc, RwLock};

use landroid_core::{DeviceSnapshot, InputError, Operation, ICON};
use serde_json::json;
use tracing::debug;

use super::{EntityCore, LandroidEntity};
use crate::api::LandroidApi;
use crate::entity_id::EntityIdError;
use crate::error::ServiceResult;
use crate::host::EntityState;
use crate::services::ServiceTable;

pub const SELECT_DOMAIN: &str = "select";

/// Entity key of the zone selector
pub const ZONE_SELECT_KEY: &str = "zoneselect";

/// Selectable zones: `"0"` plus every further zone with a starting point.
///
/// `None` unless the device reports all four zones.
pub fn zone_options(snapshot: &DeviceSnapshot) -> Option<Vec<String>> {
    let points = snapshot.zone_starting_points()?;
    let mut options = vec!["0".to_string()];
    options.extend(
        points
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, point)| **point != 0)
            .map(|(idx, _)| idx.to_string()),
    );
    Some(options)
}

/// Select entity for the next zone to mow
pub struct ZoneSelect {
    core: EntityCore,
    services: Arc<ServiceTable>,
    options: RwLock<Vec<String>>,
    current_option: RwLock<Option<String>>,
}

impl ZoneSelect {
    pub fn new(api: Arc<LandroidApi>, services: Arc<ServiceTable>) -> Result<Self, EntityIdError> {
        Ok(Self {
            core: EntityCore::keyed(api, SELECT_DOMAIN, ZONE_SELECT_KEY)?,
            services,
            options: RwLock::new(Vec::new()),
            current_option: RwLock::new(None),
        })
    }

    pub fn options(&self) -> Vec<String> {
        self.options.read().unwrap().clone()
    }

    pub fn current_option(&self) -> Option<String> {
        self.current_option.read().unwrap().clone()
    }

    fn update_zone(&self) {
        if let Some(options) = zone_options(&self.core.api().snapshot()) {
            *self.options.write().unwrap() = options;
        }
    }

    /// Re-read the current zone and write the state
    pub fn update_selected_zone(&self) {
        if self.options.read().unwrap().len() > 1 {
            self.update_zone();
        }
        *self.current_option.write().unwrap() =
            self.core.api().current_zone().map(|zone| zone.to_string());
        self.core.write_state(self.host_state());
    }

    pub fn host_state(&self) -> EntityState {
        let state = self
            .current_option()
            .unwrap_or_else(|| "unknown".to_string());
        EntityState::new(state)
            .with_attribute("options", json!(self.options()))
            .with_attribute("friendly_name", json!(self.core.name()))
            .with_attribute("icon", json!(ICON))
    }

    /// Set the next zone to be mowed
    pub async fn select_option(&self, option: &str) -> ServiceResult {
        let known = self.options().iter().any(|o| o == option);
        if !known {
            return Err(InputError::InvalidField {
                field: "option".to_string(),
                reason: format!("'{}' is not a selectable zone", option),
            }
            .into());
        }
        let zone: i64 = option.parse().map_err(|_| InputError::InvalidField {
            field: "option".to_string(),
            reason: format!("'{}' is not a zone index", option),
        })?;

        debug!(entity_id = %self.core.entity_id(), zone, "Selecting zone");
        self.services
            .call(Operation::SetZone.service_name(), json!({ "zone": zone }))
            .await
    }
}

impl LandroidEntity for ZoneSelect {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn update_callback(&self) {
        self.update_zone();
        self.update_selected_zone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landroid_core::ZoneInfo;

    fn with_points(points: Vec<i64>) -> DeviceSnapshot {
        DeviceSnapshot {
            zone: Some(ZoneInfo {
                starting_point: Some(points),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_options_skip_empty_zones() {
        assert_eq!(
            zone_options(&with_points(vec![0, 12, 0, 40])),
            Some(vec!["0".to_string(), "1".to_string(), "3".to_string()])
        );
    }

    #[test]
    fn test_first_zone_always_offered() {
        assert_eq!(
            zone_options(&with_points(vec![0, 0, 0, 0])),
            Some(vec!["0".to_string()])
        );
    }

    #[test]
    fn test_no_options_without_four_zones() {
        assert_eq!(zone_options(&with_points(vec![0, 10])), None);
        assert_eq!(zone_options(&DeviceSnapshot::default()), None);
    }
}
