//! Landroid Cloud integration
//!
//! Connects robotic mowers from the Worx, Kress and LandXcape clouds to the
//! host platform. The vendor SDK and the host are reached through the
//! [`MowerDevice`] and [`Host`] traits; everything between them lives here:
//!
//! - a single worker per device that serialises all SDK calls
//! - capability detection and the service table it resolves to
//! - the mower, zone select and button entities
//! - the Web API fallback refresh used while MQTT is down

pub mod api;
pub mod config;
pub mod dispatcher;
pub mod entity;
pub mod entity_id;
pub mod error;
pub mod fallback;
pub mod host;
pub mod sdk;
pub mod services;
pub mod setup;
pub mod worker;

pub use api::LandroidApi;
pub use config::{CloudType, ConfigError, ConfigResult, EntryInfo, LandroidConfig};
pub use dispatcher::{update_signal, Dispatcher};
pub use entity::{ButtonKind, LandroidButton, LandroidEntity, MowerEntity, ZoneSelect};
pub use entity_id::{slugify, EntityId, EntityIdError};
pub use error::{CloudError, CloudResult, ServiceError, ServiceResult};
pub use host::{DeviceInfo, EntityState, Host};
pub use sdk::{MowerDevice, UpdateCallback};
pub use services::{MowerCommand, ServiceTable};
pub use setup::{setup_device, LandroidDevice, SetupError};
pub use worker::DeviceWorker;
