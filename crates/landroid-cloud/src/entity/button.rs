//! Buttons for one-shot device operations

use std::sync::{Arc, RwLock};

use chrono::{DateTime, SecondsFormat, Utc};
use landroid_core::{LandroidFeatureSupport, Operation, ICON};
use serde_json::json;
use tracing::debug;

use super::{EntityCore, LandroidEntity};
use crate::api::LandroidApi;
use crate::entity_id::EntityIdError;
use crate::error::ServiceResult;
use crate::host::EntityState;
use crate::services::ServiceTable;

pub const BUTTON_DOMAIN: &str = "button";

/// The buttons a mower can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    Restart,
    Edgecut,
}

impl ButtonKind {
    pub const ALL: [ButtonKind; 2] = [ButtonKind::Restart, ButtonKind::Edgecut];

    pub const fn key(self) -> &'static str {
        match self {
            ButtonKind::Restart => "restart",
            ButtonKind::Edgecut => "edgecut",
        }
    }

    /// Service pressed by this button
    pub const fn operation(self) -> Operation {
        match self {
            ButtonKind::Restart => Operation::Restart,
            ButtonKind::Edgecut => Operation::Edgecut,
        }
    }

    /// Buttons whose operation is enabled by a feature set
    pub fn enabled_by(features: LandroidFeatureSupport) -> Vec<ButtonKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| features.contains(kind.operation().feature()))
            .collect()
    }
}

pub struct LandroidButton {
    core: EntityCore,
    kind: ButtonKind,
    services: Arc<ServiceTable>,
    last_pressed: RwLock<Option<DateTime<Utc>>>,
}

impl LandroidButton {
    pub fn new(
        api: Arc<LandroidApi>,
        services: Arc<ServiceTable>,
        kind: ButtonKind,
    ) -> Result<Self, EntityIdError> {
        Ok(Self {
            core: EntityCore::keyed(api, BUTTON_DOMAIN, kind.key())?,
            kind,
            services,
            last_pressed: RwLock::new(None),
        })
    }

    pub fn kind(&self) -> ButtonKind {
        self.kind
    }

    pub fn last_pressed(&self) -> Option<DateTime<Utc>> {
        *self.last_pressed.read().unwrap()
    }

    /// The button state is the time of the last successful press
    pub fn host_state(&self) -> EntityState {
        let state = self
            .last_pressed()
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| "unknown".to_string());
        EntityState::new(state)
            .with_attribute("friendly_name", json!(self.core.name()))
            .with_attribute("icon", json!(ICON))
    }

    pub async fn press(&self) -> ServiceResult {
        debug!(entity_id = %self.core.entity_id(), "Button pressed");
        self.services
            .call(self.kind.operation().service_name(), json!({}))
            .await?;

        *self.last_pressed.write().unwrap() = Some(Utc::now());
        self.core.write_state(self.host_state());
        Ok(())
    }
}

impl LandroidEntity for LandroidButton {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn update_callback(&self) {
        self.core.write_state(self.host_state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_follow_features() {
        assert_eq!(
            ButtonKind::enabled_by(LandroidFeatureSupport::BASE),
            vec![ButtonKind::Restart]
        );
        assert_eq!(
            ButtonKind::enabled_by(LandroidFeatureSupport::EDGECUT | LandroidFeatureSupport::RESTART),
            vec![ButtonKind::Restart, ButtonKind::Edgecut]
        );
        assert!(ButtonKind::enabled_by(LandroidFeatureSupport::empty()).is_empty());
    }

    #[test]
    fn test_button_services() {
        assert_eq!(ButtonKind::Restart.operation().service_name(), "restart");
        assert_eq!(ButtonKind::Edgecut.operation().service_name(), "edgecut");
    }
}
