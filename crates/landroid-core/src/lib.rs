//! Domain model for the Landroid Cloud integration
//!
//! This crate holds the logic that does not depend on the host platform or
//! the vendor SDK: capability flags and the operations they enable, the
//! device snapshot model, attribute extraction, status classification,
//! schedule merging and device config encoding.

pub mod attributes;
pub mod capability;
pub mod error;
pub mod schedule;
pub mod settings;
pub mod snapshot;
pub mod status;

pub use attributes::{Attributes, ICON};
pub use capability::{DeviceCapability, LandroidFeatureSupport, Operation, VendorCapabilities};
pub use error::{InputError, InputResult};
pub use schedule::{
    DayUpdate, DeviceSchedules, EncodedSchedule, ScheduleDay, ScheduleKind, ScheduleUpdate,
    Weekday, WeeklySchedule,
};
pub use settings::ConfigUpdate;
pub use snapshot::{
    Battery, DeviceSnapshot, ErrorInfo, GpsLocation, ProductInfo, StatusInfo, ZoneInfo,
};
pub use status::MowerState;

/// Integration domain
pub const DOMAIN: &str = "landroid_cloud";

/// Prefix of the per-device update signal
pub const UPDATE_SIGNAL: &str = "landroid_cloud_update";
