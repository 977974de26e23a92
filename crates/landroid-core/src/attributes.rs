//! Entity attribute extraction
//!
//! Copies vendor fields into the flat attribute mapping shown on the mower
//! entity, renaming them through [`ATTRIBUTE_MAP`]. Fields the device did
//! not report are left out, never written as null.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use crate::capability::DeviceCapability;
use crate::snapshot::DeviceSnapshot;

/// Attribute mapping as written to the host
pub type Attributes = IndexMap<String, Value>;

/// Icon for every Landroid entity
pub const ICON: &str = "mdi:robot-mower";

/// Vendor field name to attribute name
pub const ATTRIBUTE_MAP: &[(&str, &str)] = &[
    ("id", "cloud_id"),
    ("blades", "blades"),
    ("battery", "battery"),
    ("work_time", "work_time"),
    ("distance", "distance"),
    ("rssi", "rssi"),
    ("orientation", "orientation"),
    ("gps", "gps_location"),
    ("rainsensor", "rainsensor"),
    ("firmware_version", "firmware_version"),
    ("partymode_enabled", "partymode_enabled"),
    ("locked", "locked"),
    ("online", "online"),
    ("accessories", "accessories"),
    ("zone", "zone"),
    ("schedule_mower_active", "schedule_enabled"),
    ("schedule_variation", "time_extension"),
    ("schedules", "schedules"),
    ("error", "error"),
    ("torque", "wheel_torque"),
    ("battery_charging", "charging"),
    ("updated", "last_update"),
];

fn to_value<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok().filter(|v| !v.is_null())
}

/// The value of a vendor field, `None` when the device did not report it
fn vendor_field(snapshot: &DeviceSnapshot, field: &str) -> Option<Value> {
    let value = match field {
        "id" => snapshot.id.clone(),
        "blades" => snapshot.blades.clone(),
        "battery" => snapshot.battery.as_ref().and_then(to_value),
        "work_time" => snapshot.work_time.clone(),
        "distance" => snapshot.distance.clone(),
        "rssi" => snapshot.rssi.map(|v| json!(v)),
        "orientation" => snapshot.orientation.clone(),
        "gps" => snapshot
            .gps
            .as_ref()
            .filter(|gps| gps.is_complete())
            .and_then(to_value),
        "rainsensor" => snapshot.rainsensor.clone(),
        "firmware_version" => snapshot.firmware_version.as_ref().map(|v| json!(v)),
        "partymode_enabled" => snapshot.partymode_enabled.map(|v| json!(v)),
        "locked" => snapshot.locked.map(|v| json!(v)),
        "online" => snapshot.online.map(|v| json!(v)),
        "accessories" => snapshot.accessories.clone(),
        "zone" => snapshot.zone.as_ref().and_then(to_value),
        "schedule_mower_active" => snapshot.schedule_mower_active.map(|v| json!(v)),
        "schedule_variation" => snapshot.schedule_variation.map(|v| json!(v)),
        "schedules" => snapshot.schedules.as_ref().and_then(to_value),
        "error" => to_value(&snapshot.error),
        "torque" => snapshot
            .torque
            .filter(|_| snapshot.device_capabilities().contains(DeviceCapability::TORQUE))
            .map(|v| json!(v)),
        "battery_charging" => snapshot.battery_charging.map(|v| json!(v)),
        "updated" => snapshot.updated.as_ref().map(|v| json!(v)),
        _ => None,
    };
    value.filter(|v| !v.is_null())
}

/// Extract the attributes for one refresh.
///
/// `wheel_torque` is only kept for devices with the torque capability and
/// `gps_location` only when both coordinates are known.
pub fn extract(snapshot: &DeviceSnapshot) -> Attributes {
    let mut attributes = Attributes::new();
    for (field, attr) in ATTRIBUTE_MAP {
        if let Some(value) = vendor_field(snapshot, field) {
            attributes.insert((*attr).to_string(), value);
        }
    }

    attributes.insert(
        "capabilities".to_string(),
        json!(snapshot.device_capabilities().labels()),
    );
    attributes.insert(
        "mqtt".to_string(),
        json!({ "connected": snapshot.mqtt_connected }),
    );
    attributes
}

/// Merge a fresh extraction into the previous attributes.
///
/// Keys the device stopped reporting keep their last value, except those
/// the extraction rules drop on purpose.
pub fn merge_into(previous: &mut Attributes, fresh: Attributes, snapshot: &DeviceSnapshot) {
    if !snapshot.device_capabilities().contains(DeviceCapability::TORQUE) {
        previous.shift_remove("wheel_torque");
    }
    if !snapshot.gps.as_ref().is_some_and(|gps| gps.is_complete()) {
        previous.shift_remove("gps_location");
    }
    previous.extend(fresh);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Battery, ErrorInfo, GpsLocation};

    fn snapshot() -> DeviceSnapshot {
        DeviceSnapshot {
            name: "Mow Betty".to_string(),
            online: Some(true),
            id: Some(json!(4711)),
            battery: Some(Battery {
                percent: Some(80),
                ..Default::default()
            }),
            rssi: Some(-60),
            schedule_mower_active: Some(true),
            schedule_variation: Some(10),
            torque: Some(20),
            error: ErrorInfo {
                id: Some(0),
                description: Some("No error".to_string()),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_renames_and_omits_absent_fields() {
        let attrs = extract(&snapshot());

        assert_eq!(attrs.get("cloud_id"), Some(&json!(4711)));
        assert_eq!(attrs.get("schedule_enabled"), Some(&json!(true)));
        assert_eq!(attrs.get("time_extension"), Some(&json!(10)));
        assert_eq!(attrs.get("rssi"), Some(&json!(-60)));
        assert!(!attrs.contains_key("blades"));
        assert!(!attrs.contains_key("last_update"));
        assert!(attrs.values().all(|v| !v.is_null()));
    }

    #[test]
    fn test_torque_requires_capability() {
        let mut snap = snapshot();
        assert!(!extract(&snap).contains_key("wheel_torque"));

        snap.capabilities = DeviceCapability::TORQUE.bits();
        let attrs = extract(&snap);
        assert_eq!(attrs.get("wheel_torque"), Some(&json!(20)));
        assert_eq!(attrs.get("capabilities"), Some(&json!(["Motor Torque"])));
    }

    #[test]
    fn test_incomplete_gps_is_dropped() {
        let mut snap = snapshot();
        snap.gps = Some(GpsLocation {
            latitude: Some(55.6),
            longitude: None,
        });
        assert!(!extract(&snap).contains_key("gps_location"));

        snap.gps = Some(GpsLocation {
            latitude: Some(55.6),
            longitude: Some(12.5),
        });
        assert_eq!(
            extract(&snap).get("gps_location"),
            Some(&json!({"latitude": 55.6, "longitude": 12.5}))
        );
    }

    #[test]
    fn test_mqtt_and_capabilities_always_written() {
        let attrs = extract(&DeviceSnapshot::default());
        assert_eq!(attrs.get("mqtt"), Some(&json!({"connected": false})));
        assert_eq!(attrs.get("capabilities"), Some(&json!([])));
    }

    #[test]
    fn test_merge_keeps_stale_keys_but_drops_torque() {
        let mut snap = snapshot();
        snap.capabilities = DeviceCapability::TORQUE.bits();
        let mut attrs = extract(&snap);
        assert!(attrs.contains_key("rssi"));

        snap.rssi = None;
        snap.capabilities = 0;
        let fresh = extract(&snap);
        merge_into(&mut attrs, fresh, &snap);

        assert_eq!(attrs.get("rssi"), Some(&json!(-60)));
        assert!(!attrs.contains_key("wheel_torque"));
    }

    #[test]
    fn test_attribute_names_come_from_map() {
        let attrs = extract(&snapshot());
        assert_eq!(attrs.get("time_extension"), Some(&json!(10)));
        assert_eq!(attrs.get("schedule_enabled"), Some(&json!(true)));

        for key in attrs.keys() {
            let mapped = ATTRIBUTE_MAP.iter().any(|(_, attr)| attr == key);
            assert!(mapped || key == "capabilities" || key == "mqtt", "unmapped attribute {}", key);
        }
    }
}
