//! Capability flags and the static operation table
//!
//! A device session detects its features once. The resulting
//! [`LandroidFeatureSupport`] set decides which [`Operation`]s are exposed
//! as services; each flag gates exactly one operation.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Features supported by a mower, as seen by the integration
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LandroidFeatureSupport: u32 {
        const EDGECUT = 1;
        const LOCK = 1 << 1;
        const PARTYMODE = 1 << 2;
        const SETZONE = 1 << 3;
        const RESTART = 1 << 4;
        const CONFIG = 1 << 5;
        const OTS = 1 << 6;
        const SCHEDULES = 1 << 7;
        const TORQUE = 1 << 8;
    }
}

bitflags! {
    /// Capabilities reported by the device itself
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeviceCapability: u32 {
        const ONE_TIME_SCHEDULE = 1;
        const EDGE_CUT = 1 << 1;
        const PARTY_MODE = 1 << 2;
        const TORQUE = 1 << 3;
    }
}

impl DeviceCapability {
    /// Display labels used in the `capabilities` attribute, in a fixed order
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (Self::ONE_TIME_SCHEDULE, "One-Time-Schedule"),
            (Self::EDGE_CUT, "Edge cut"),
            (Self::PARTY_MODE, "Party Mode"),
            (Self::TORQUE, "Motor Torque"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, label)| label)
        .collect()
    }
}

/// Vendor booleans consulted during feature detection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VendorCapabilities {
    pub partymode_capable: bool,
    pub ots_capable: bool,
    pub torque_capable: bool,
}

impl LandroidFeatureSupport {
    /// Features every cloud-connected mower supports
    pub const BASE: Self = Self::LOCK
        .union(Self::SETZONE)
        .union(Self::RESTART)
        .union(Self::CONFIG)
        .union(Self::SCHEDULES);

    /// Combine platform base features with what the vendor reports
    pub fn detect(base: Self, vendor: &VendorCapabilities) -> Self {
        let mut features = base;
        if vendor.partymode_capable {
            features |= Self::PARTYMODE;
        }
        if vendor.ots_capable {
            features |= Self::EDGECUT | Self::OTS;
        }
        if vendor.torque_capable {
            features |= Self::TORQUE;
        }
        features
    }
}

/// An operation a mower can be asked to perform through a service call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Edgecut,
    ToggleLock,
    TogglePartymode,
    SetZone,
    Restart,
    Config,
    Ots,
    SetSchedule,
    SetTorque,
}

impl Operation {
    /// Every operation, in registration order
    pub const ALL: [Operation; 9] = [
        Operation::Edgecut,
        Operation::ToggleLock,
        Operation::TogglePartymode,
        Operation::SetZone,
        Operation::Restart,
        Operation::Config,
        Operation::Ots,
        Operation::SetSchedule,
        Operation::SetTorque,
    ];

    /// The feature flag that gates this operation
    pub const fn feature(self) -> LandroidFeatureSupport {
        match self {
            Operation::Edgecut => LandroidFeatureSupport::EDGECUT,
            Operation::ToggleLock => LandroidFeatureSupport::LOCK,
            Operation::TogglePartymode => LandroidFeatureSupport::PARTYMODE,
            Operation::SetZone => LandroidFeatureSupport::SETZONE,
            Operation::Restart => LandroidFeatureSupport::RESTART,
            Operation::Config => LandroidFeatureSupport::CONFIG,
            Operation::Ots => LandroidFeatureSupport::OTS,
            Operation::SetSchedule => LandroidFeatureSupport::SCHEDULES,
            Operation::SetTorque => LandroidFeatureSupport::TORQUE,
        }
    }

    /// Service name exposed to the host
    pub const fn service_name(self) -> &'static str {
        match self {
            Operation::Edgecut => "edgecut",
            Operation::ToggleLock => "lock",
            Operation::TogglePartymode => "partymode",
            Operation::SetZone => "setzone",
            Operation::Restart => "restart",
            Operation::Config => "config",
            Operation::Ots => "ots",
            Operation::SetSchedule => "schedule",
            Operation::SetTorque => "torque",
        }
    }

    /// Look up an operation by its service name
    pub fn from_service_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.service_name() == name)
    }

    /// Resolve the operations enabled by a feature set
    pub fn enabled_by(features: LandroidFeatureSupport) -> Vec<Operation> {
        Self::ALL
            .into_iter()
            .filter(|op| features.contains(op.feature()))
            .collect()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_name())
    }
}
