//! Vendor SDK seam
//!
//! The cloud SDK owns the network transport, the MQTT push channel and the
//! device state. This crate only talks to it through [`MowerDevice`].
//! Every method may block on network I/O, so callers go through the
//! [`DeviceWorker`](crate::worker::DeviceWorker) instead of calling the
//! handle directly from async code.

use std::sync::Arc;

use landroid_core::DeviceSnapshot;

use crate::error::CloudResult;

/// Callback fired by the SDK whenever new device data arrives
pub type UpdateCallback = Arc<dyn Fn() + Send + Sync>;

/// A blocking handle to one physical mower
pub trait MowerDevice: Send + Sync + 'static {
    /// Copy of the current device state
    fn snapshot(&self) -> DeviceSnapshot;

    /// Force a refresh of the device state over the Web API
    fn update(&self) -> CloudResult<()>;

    /// Install the push callback
    fn set_callback(&self, callback: UpdateCallback);

    fn start(&self) -> CloudResult<()>;

    fn pause(&self) -> CloudResult<()>;

    fn home(&self) -> CloudResult<()>;

    /// Return to the dock following the boundary wire
    fn safehome(&self) -> CloudResult<()>;

    /// Restart the baseboard OS
    fn restart(&self) -> CloudResult<()>;

    fn setzone(&self, zone: &str) -> CloudResult<()>;

    /// Send a raw JSON payload to the device
    fn send(&self, payload: &str) -> CloudResult<()>;

    fn lock(&self, enabled: bool) -> CloudResult<()>;

    /// Start a one-time schedule; `runtime` is in minutes
    fn ots(&self, boundary: bool, runtime: u32) -> CloudResult<()>;

    fn toggle_partymode(&self, enabled: bool) -> CloudResult<()>;

    fn set_torque(&self, torque: i32) -> CloudResult<()>;
}
