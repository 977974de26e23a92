//! Mower entity, exposed to the host as a vacuum

use std::sync::Arc;

use landroid_core::{MowerState, ICON};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{EntityCore, LandroidEntity};
use crate::api::LandroidApi;
use crate::entity_id::EntityIdError;
use crate::error::ServiceResult;
use crate::host::EntityState;
use crate::services::ServiceTable;

/// Host domain of the mower entity
pub const VACUUM_DOMAIN: &str = "vacuum";

/// The main entity of a mower
pub struct MowerEntity {
    core: EntityCore,
    services: Arc<ServiceTable>,
}

impl MowerEntity {
    pub fn new(api: Arc<LandroidApi>, services: Arc<ServiceTable>) -> Result<Self, EntityIdError> {
        Ok(Self {
            core: EntityCore::mower(api, VACUUM_DOMAIN)?,
            services,
        })
    }

    /// State pushed by the SDK, never polled
    pub fn should_poll(&self) -> bool {
        false
    }

    pub fn battery_level(&self) -> Option<i64> {
        self.core.data().battery_level
    }

    pub fn available(&self) -> bool {
        self.core.data().available
    }

    pub fn state(&self) -> MowerState {
        self.core.state()
    }

    /// Build the state written to the host
    pub fn host_state(&self) -> EntityState {
        let data = self.core.data();
        let mut state = EntityState::new(data.state.as_str()).with_available(data.available);
        state.attributes = data.attributes;
        if let Some(level) = data.battery_level {
            state.attributes.insert("battery_level".to_string(), json!(level));
        }
        state
            .with_attribute("friendly_name", json!(self.core.name()))
            .with_attribute("icon", json!(ICON))
    }

    pub async fn start(&self) -> ServiceResult {
        debug!(entity_id = %self.core.entity_id(), "Starting");
        Ok(self.core.api().run(|d| d.start()).await??)
    }

    pub async fn pause(&self) -> ServiceResult {
        debug!(entity_id = %self.core.entity_id(), "Pausing");
        Ok(self.core.api().run(|d| d.pause()).await??)
    }

    /// Pause while cutting, start otherwise
    pub async fn start_pause(&self) -> ServiceResult {
        debug!(entity_id = %self.core.entity_id(), "Toggling state");
        if self.state().is_mowing() {
            self.pause().await
        } else {
            self.start().await
        }
    }

    /// Send the mower home unless it is docked or already on its way
    pub async fn return_to_base(&self) -> ServiceResult {
        if matches!(self.state(), MowerState::Docked | MowerState::Returning) {
            debug!(entity_id = %self.core.entity_id(), "Already home, not sending mower back");
            return Ok(());
        }

        debug!(entity_id = %self.core.entity_id(), "Going back to dock");
        let name = self.core.api().name().to_string();
        Ok(self
            .core
            .api()
            .run(move |d| {
                // home is sent regardless, the device may ignore safehome
                if let Err(e) = d.safehome() {
                    warn!(device = %name, error = %e, "Safe home failed");
                }
                d.home()
            })
            .await??)
    }

    pub async fn stop(&self) -> ServiceResult {
        self.return_to_base().await
    }

    /// Call one of the capability-gated services on this mower
    pub async fn call_service(&self, service: &str, data: Value) -> ServiceResult {
        self.services.call(service, data).await
    }

    pub fn services(&self) -> &Arc<ServiceTable> {
        &self.services
    }
}

impl LandroidEntity for MowerEntity {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn update_callback(&self) {
        self.core.data_update();
        self.core.write_state(self.host_state());
    }
}
