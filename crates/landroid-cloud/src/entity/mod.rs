//! Landroid entities
//!
//! One mower entity per device plus a zone selector and buttons for the
//! operations the device supports.

mod base;
mod button;
mod select;
mod vacuum;

pub use base::{CoreData, EntityCore};
pub use button::{ButtonKind, LandroidButton};
pub use select::{zone_options, ZoneSelect, ZONE_SELECT_KEY};
pub use vacuum::MowerEntity;

use crate::entity_id::EntityId;

/// Behaviour shared by every Landroid entity
pub trait LandroidEntity: Send + Sync {
    fn core(&self) -> &EntityCore;

    /// Called whenever the device's update signal fires
    fn update_callback(&self);

    /// Called once after the entity was added to the host
    fn added_to_host(&self) {
        self.core().added_to_host();
        self.update_callback();
    }

    fn entity_id(&self) -> &EntityId {
        self.core().entity_id()
    }
}
