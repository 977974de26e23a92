//! Capability-gated service dispatch
//!
//! The service table is resolved once from the detected feature set. A call
//! parses its data into a [`MowerCommand`] and executes it on the device
//! worker; input errors abort before anything reaches the device.

use std::sync::Arc;

use dashmap::DashMap;
use landroid_core::schedule;
use landroid_core::{ConfigUpdate, InputError, InputResult, Operation, ScheduleUpdate};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::api::LandroidApi;
use crate::error::{CloudError, ServiceError, ServiceResult};

/// Allowed wheel torque range, in percent
pub const TORQUE_RANGE: std::ops::RangeInclusive<i64> = -50..=50;

/// Highest zone index
pub const MAX_ZONE: i64 = 3;

/// A parsed service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MowerCommand {
    /// Cut along the boundary wire
    Edgecut,
    ToggleLock,
    TogglePartymode,
    SetZone { zone: i64 },
    Restart,
    Config(ConfigUpdate),
    /// One-time schedule; `runtime` in minutes
    Ots { boundary: bool, runtime: u32 },
    SetSchedule(ScheduleUpdate),
    SetTorque { torque: i32 },
}

impl MowerCommand {
    /// Parse service call data for an operation
    pub fn parse(operation: Operation, data: &Value) -> InputResult<Self> {
        let command = match operation {
            Operation::Edgecut => MowerCommand::Edgecut,
            Operation::ToggleLock => MowerCommand::ToggleLock,
            Operation::TogglePartymode => MowerCommand::TogglePartymode,
            Operation::Restart => MowerCommand::Restart,
            Operation::SetZone => {
                let zone = require_int(data, "zone")?;
                if !(0..=MAX_ZONE).contains(&zone) {
                    return Err(InputError::InvalidField {
                        field: "zone".to_string(),
                        reason: format!("must be between 0 and {}", MAX_ZONE),
                    });
                }
                MowerCommand::SetZone { zone }
            }
            Operation::Config => MowerCommand::Config(ConfigUpdate::from_service_data(data)?),
            Operation::Ots => {
                let boundary = data
                    .get("boundary")
                    .and_then(Value::as_bool)
                    .ok_or_else(|| InputError::MissingField("boundary".to_string()))?;
                let runtime = require_int(data, "runtime")?;
                let runtime = u32::try_from(runtime).map_err(|_| InputError::InvalidField {
                    field: "runtime".to_string(),
                    reason: "must be a positive number of minutes".to_string(),
                })?;
                MowerCommand::Ots { boundary, runtime }
            }
            Operation::SetSchedule => {
                MowerCommand::SetSchedule(ScheduleUpdate::from_service_data(data)?)
            }
            Operation::SetTorque => {
                let torque = require_int(data, "torque")?;
                if !TORQUE_RANGE.contains(&torque) {
                    return Err(InputError::InvalidField {
                        field: "torque".to_string(),
                        reason: format!(
                            "must be between {} and {}",
                            TORQUE_RANGE.start(),
                            TORQUE_RANGE.end()
                        ),
                    });
                }
                MowerCommand::SetTorque {
                    torque: torque as i32,
                }
            }
        };
        Ok(command)
    }

    pub fn operation(&self) -> Operation {
        match self {
            MowerCommand::Edgecut => Operation::Edgecut,
            MowerCommand::ToggleLock => Operation::ToggleLock,
            MowerCommand::TogglePartymode => Operation::TogglePartymode,
            MowerCommand::SetZone { .. } => Operation::SetZone,
            MowerCommand::Restart => Operation::Restart,
            MowerCommand::Config(_) => Operation::Config,
            MowerCommand::Ots { .. } => Operation::Ots,
            MowerCommand::SetSchedule(_) => Operation::SetSchedule,
            MowerCommand::SetTorque { .. } => Operation::SetTorque,
        }
    }

    /// Execute the command against a device
    pub async fn execute(self, api: &LandroidApi) -> ServiceResult {
        let name = api.name().to_string();
        match self {
            MowerCommand::Edgecut => {
                debug!(device = %name, "Starting edge cut task");
                match api.run(|d| d.ots(true, 0)).await? {
                    Err(e @ CloudError::NoOneTimeSchedule) => {
                        error!(device = %name, "{}", e);
                        Ok(())
                    }
                    result => Ok(result?),
                }
            }
            MowerCommand::ToggleLock => {
                let locked = api
                    .run(|d| {
                        let locked = !d.snapshot().locked.unwrap_or(false);
                        d.lock(locked).map(|_| locked)
                    })
                    .await??;
                debug!(device = %name, locked, "Set locked state");
                Ok(())
            }
            MowerCommand::TogglePartymode => {
                let result = api
                    .run(|d| {
                        let enabled = !d.snapshot().partymode_enabled.unwrap_or(false);
                        d.toggle_partymode(enabled).map(|_| enabled)
                    })
                    .await?;
                match result {
                    Ok(enabled) => {
                        debug!(device = %name, enabled, "Set party mode");
                        Ok(())
                    }
                    Err(e @ CloudError::NoPartymode) => {
                        error!(device = %name, "{}", e);
                        Ok(())
                    }
                    Err(e) => Err(e.into()),
                }
            }
            MowerCommand::SetZone { zone } => {
                debug!(device = %name, zone, "Setting zone");
                api.run(move |d| d.setzone(&zone.to_string())).await??;
                api.set_current_zone(Some(zone));
                Ok(())
            }
            MowerCommand::Restart => {
                debug!(device = %name, "Restarting");
                Ok(api.run(|d| d.restart()).await??)
            }
            MowerCommand::Config(update) => {
                let Some(payload) = update.encode()? else {
                    debug!(device = %name, "Config update is empty, nothing sent");
                    return Ok(());
                };
                let payload = payload.to_string();
                debug!(device = %name, config = %payload, "New config");
                Ok(api.run(move |d| d.send(&payload)).await??)
            }
            MowerCommand::Ots { boundary, runtime } => {
                debug!(device = %name, boundary, runtime, "Starting OTS");
                Ok(api.run(move |d| d.ots(boundary, runtime)).await??)
            }
            MowerCommand::SetSchedule(update) => {
                let existing = api
                    .snapshot()
                    .schedules
                    .ok_or(ServiceError::NoSchedules)?;
                let payload = schedule::merge(&update, &existing).to_payload().to_string();
                debug!(device = %name, kind = %update.kind, schedule = %payload, "New schedule");
                Ok(api.run(move |d| d.send(&payload)).await??)
            }
            MowerCommand::SetTorque { torque } => {
                debug!(device = %name, torque, "Setting wheel torque");
                Ok(api.run(move |d| d.set_torque(torque)).await??)
            }
        }
    }
}

fn require_int(data: &Value, field: &str) -> InputResult<i64> {
    let value = data
        .get(field)
        .ok_or_else(|| InputError::MissingField(field.to_string()))?;
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| InputError::InvalidField {
        field: field.to_string(),
        reason: format!("expected an integer, got {}", value),
    })
}

/// Services registered for one device
pub struct ServiceTable {
    api: Arc<LandroidApi>,
    /// Operations indexed by service name
    services: DashMap<&'static str, Operation>,
}

impl ServiceTable {
    /// Resolve the services enabled by the device's detected features
    pub fn from_features(api: Arc<LandroidApi>) -> Self {
        let features = api.features();
        let services = DashMap::new();

        if features.is_empty() {
            info!(
                device = %api.name(),
                "No services registered as feature flags is set to {}",
                features.bits()
            );
        } else {
            info!(
                device = %api.name(),
                "Registering services with feature flags set to {}",
                features.bits()
            );
            for op in Operation::enabled_by(features) {
                services.insert(op.service_name(), op);
            }
        }

        Self { api, services }
    }

    pub fn has_service(&self, service: &str) -> bool {
        self.services.contains_key(service)
    }

    /// Registered operations, in table order
    pub fn operations(&self) -> Vec<Operation> {
        let mut ops: Vec<Operation> = self.services.iter().map(|e| *e.value()).collect();
        ops.sort();
        ops
    }

    /// Call a service by name
    #[instrument(skip(self, data), fields(device = %self.api.name()))]
    pub async fn call(&self, service: &str, data: Value) -> ServiceResult {
        let operation = match self.services.get(service) {
            Some(entry) => *entry.value(),
            None => {
                warn!(service = %service, "Service not supported");
                return Err(ServiceError::NotSupported {
                    service: service.to_string(),
                });
            }
        };

        let command = MowerCommand::parse(operation, &data)?;
        debug!(service = %service, "Calling service");
        command.execute(&self.api).await
    }

    pub fn api(&self) -> &Arc<LandroidApi> {
        &self.api
    }
}
