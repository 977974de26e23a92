//! Replay device
//!
//! Stands in for the vendor SDK: the device state comes from a JSON
//! snapshot file, commands change that state the way the mower would and
//! every change is pushed back through the update callback.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use landroid_cloud::{CloudError, CloudResult, MowerDevice, UpdateCallback};
use landroid_core::DeviceSnapshot;
use serde_json::Value;
use tracing::{debug, info};

/// Vendor status codes set by the replayed commands
mod status {
    pub const IDLE: i64 = 0;
    pub const RETURNING: i64 = 5;
    pub const SAFE_HOMING: i64 = 30;
    pub const EDGECUT: i64 = 32;
    pub const MOWING: i64 = 7;
    pub const PAUSED: i64 = 34;
}

pub struct ReplayDevice {
    path: Option<PathBuf>,
    snapshot: Mutex<DeviceSnapshot>,
    callback: Mutex<Option<UpdateCallback>>,
}

impl ReplayDevice {
    /// Load the device state from a snapshot file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let snapshot = read_snapshot(path)
            .with_context(|| format!("failed to load device snapshot {:?}", path))?;
        info!(device = %snapshot.name, "Loaded device snapshot from {:?}", path);

        Ok(Self {
            path: Some(path.to_path_buf()),
            snapshot: Mutex::new(snapshot),
            callback: Mutex::new(None),
        })
    }

    /// A device that is not backed by a file; refreshes keep the state
    pub fn from_snapshot(snapshot: DeviceSnapshot) -> Self {
        Self {
            path: None,
            snapshot: Mutex::new(snapshot),
            callback: Mutex::new(None),
        }
    }

    fn notify(&self) {
        let callback = self.callback.lock().unwrap().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Change the state and push it
    fn apply(&self, change: impl FnOnce(&mut DeviceSnapshot)) -> CloudResult<()> {
        {
            let mut snapshot = self.snapshot.lock().unwrap();
            change(&mut *snapshot);
        }
        self.notify();
        Ok(())
    }

    fn set_status(&self, code: i64) -> CloudResult<()> {
        self.apply(|s| s.status.id = Some(code))
    }
}

fn read_snapshot(path: &Path) -> anyhow::Result<DeviceSnapshot> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

impl MowerDevice for ReplayDevice {
    fn snapshot(&self) -> DeviceSnapshot {
        self.snapshot.lock().unwrap().clone()
    }

    fn update(&self) -> CloudResult<()> {
        if let Some(path) = &self.path {
            let snapshot = read_snapshot(path).map_err(|e| CloudError::Api(format!("{:#}", e)))?;
            debug!(device = %snapshot.name, "Reloaded snapshot");
            *self.snapshot.lock().unwrap() = snapshot;
        }
        self.notify();
        Ok(())
    }

    fn set_callback(&self, callback: UpdateCallback) {
        *self.callback.lock().unwrap() = Some(callback);
    }

    fn start(&self) -> CloudResult<()> {
        info!("start");
        self.set_status(status::MOWING)
    }

    fn pause(&self) -> CloudResult<()> {
        info!("pause");
        self.set_status(status::PAUSED)
    }

    fn home(&self) -> CloudResult<()> {
        info!("home");
        self.set_status(status::RETURNING)
    }

    fn safehome(&self) -> CloudResult<()> {
        info!("safehome");
        self.set_status(status::SAFE_HOMING)
    }

    fn restart(&self) -> CloudResult<()> {
        info!("restart");
        self.set_status(status::IDLE)
    }

    fn setzone(&self, zone: &str) -> CloudResult<()> {
        info!(zone, "setzone");
        let zone: i64 = zone
            .parse()
            .map_err(|_| CloudError::Api(format!("invalid zone '{}'", zone)))?;
        self.apply(|s| {
            if let Some(info) = s.zone.as_mut() {
                info.current = Some(zone);
            }
        })
    }

    fn send(&self, payload: &str) -> CloudResult<()> {
        info!(payload, "send");
        let payload: Value = serde_json::from_str(payload)
            .map_err(|e| CloudError::Api(format!("payload is not JSON: {}", e)))?;
        self.apply(|s| {
            if let Some(percent) = payload.pointer("/sc/p").and_then(Value::as_i64) {
                s.schedule_variation = Some(percent);
            }
        })
    }

    fn lock(&self, enabled: bool) -> CloudResult<()> {
        info!(enabled, "lock");
        self.apply(|s| s.locked = Some(enabled))
    }

    fn ots(&self, boundary: bool, runtime: u32) -> CloudResult<()> {
        info!(boundary, runtime, "ots");
        if !self.snapshot().ots_capable {
            return Err(CloudError::NoOneTimeSchedule);
        }
        self.set_status(if boundary {
            status::EDGECUT
        } else {
            status::MOWING
        })
    }

    fn toggle_partymode(&self, enabled: bool) -> CloudResult<()> {
        info!(enabled, "partymode");
        if !self.snapshot().partymode_capable {
            return Err(CloudError::NoPartymode);
        }
        self.apply(|s| s.partymode_enabled = Some(enabled))
    }

    fn set_torque(&self, torque: i32) -> CloudResult<()> {
        info!(torque, "torque");
        if !self.snapshot().torque_capable {
            return Err(CloudError::Api("device has no torque setting".to_string()));
        }
        self.apply(|s| s.torque = Some(i64::from(torque)))
    }
}
