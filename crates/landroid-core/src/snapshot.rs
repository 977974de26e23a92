//! Device state as reported by the vendor cloud
//!
//! Every vendor property is optional: a device only reports what its
//! firmware supports, and the integration must not invent values for the
//! rest.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::{DeviceCapability, VendorCapabilities};
use crate::schedule::DeviceSchedules;

/// Error code and description reported by the device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operational status code and description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Product identity of the mower
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub model: String,
}

/// Battery readings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charging: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles: Option<Value>,
}

/// Multi-zone configuration and the zone currently selected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicies: Option<Vec<i64>>,
    /// Distance in meters from the dock where each of the four zones starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_point: Option<Vec<i64>>,
}

/// GPS position; only meaningful when both coordinates are present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl GpsLocation {
    pub fn is_complete(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Point-in-time copy of everything the device handle exposes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSnapshot {
    pub name: String,
    pub product: ProductInfo,
    pub online: Option<bool>,
    pub id: Option<Value>,
    pub blades: Option<Value>,
    pub battery: Option<Battery>,
    pub work_time: Option<Value>,
    pub distance: Option<Value>,
    pub rssi: Option<i64>,
    pub orientation: Option<Value>,
    pub gps: Option<GpsLocation>,
    pub rainsensor: Option<Value>,
    pub firmware_version: Option<String>,
    pub partymode_enabled: Option<bool>,
    pub locked: Option<bool>,
    pub accessories: Option<Value>,
    pub zone: Option<ZoneInfo>,
    pub schedule_mower_active: Option<bool>,
    pub schedule_variation: Option<i64>,
    pub schedules: Option<DeviceSchedules>,
    pub error: ErrorInfo,
    pub status: StatusInfo,
    pub torque: Option<i64>,
    pub battery_charging: Option<bool>,
    pub updated: Option<String>,
    pub mqtt_connected: bool,
    pub partymode_capable: bool,
    pub ots_capable: bool,
    pub torque_capable: bool,
    /// Raw [`DeviceCapability`] bits
    pub capabilities: u32,
}

impl DeviceSnapshot {
    pub fn is_online(&self) -> bool {
        self.online.unwrap_or(false)
    }

    pub fn device_capabilities(&self) -> DeviceCapability {
        DeviceCapability::from_bits_truncate(self.capabilities)
    }

    pub fn vendor_capabilities(&self) -> VendorCapabilities {
        VendorCapabilities {
            partymode_capable: self.partymode_capable,
            ots_capable: self.ots_capable,
            torque_capable: self.torque_capable,
        }
    }

    pub fn battery_percent(&self) -> Option<i64> {
        self.battery.as_ref().and_then(|b| b.percent)
    }

    /// Zone starting points, only when the device reports all four zones
    pub fn zone_starting_points(&self) -> Option<&[i64]> {
        self.zone
            .as_ref()
            .and_then(|z| z.starting_point.as_deref())
            .filter(|points| points.len() == 4)
    }
}
