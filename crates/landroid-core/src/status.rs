//! Mower state classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code the vendor uses for "waiting after rain"
pub const RAIN_DELAY_ERROR: i64 = 5;

/// State shown for the mower entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MowerState {
    #[default]
    Initializing,
    Offline,
    Error,
    RainDelay,
    Idle,
    Docked,
    Starting,
    Returning,
    SearchingZone,
    Mowing,
    Zoning,
    Edgecut,
    Paused,
}

impl MowerState {
    pub const fn as_str(self) -> &'static str {
        match self {
            MowerState::Initializing => "initializing",
            MowerState::Offline => "offline",
            MowerState::Error => "error",
            MowerState::RainDelay => "rain_delay",
            MowerState::Idle => "idle",
            MowerState::Docked => "docked",
            MowerState::Starting => "starting",
            MowerState::Returning => "returning",
            MowerState::SearchingZone => "searching_zone",
            MowerState::Mowing => "mowing",
            MowerState::Zoning => "zoning",
            MowerState::Edgecut => "edgecut",
            MowerState::Paused => "paused",
        }
    }

    /// Map a vendor status code, `None` for codes this integration does not know
    pub fn from_status_code(code: i64) -> Option<Self> {
        let state = match code {
            0 => MowerState::Idle,
            1 => MowerState::Docked,
            2 | 3 | 33 => MowerState::Starting,
            4 | 5 | 30 | 104 => MowerState::Returning,
            6 | 103 => MowerState::SearchingZone,
            7 | 12 => MowerState::Mowing,
            8..=11 => MowerState::Error,
            31 => MowerState::Zoning,
            32 => MowerState::Edgecut,
            34 => MowerState::Paused,
            _ => return None,
        };
        Some(state)
    }

    /// Whether the mower is cutting grass in any form
    pub fn is_mowing(self) -> bool {
        matches!(
            self,
            MowerState::Mowing | MowerState::Zoning | MowerState::Edgecut
        )
    }
}

impl fmt::Display for MowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error code counts as "no error" when absent, `-1` or `0`
pub fn has_error(error: Option<i64>) -> bool {
    matches!(error, Some(code) if code > 0)
}

/// Derive the mower state.
///
/// Precedence: offline, explicit error, rain delay, mapped status code,
/// then initializing for anything unmapped.
pub fn classify(online: bool, error: Option<i64>, status: Option<i64>) -> MowerState {
    if !has_error(error) && !online {
        return MowerState::Offline;
    }
    match error {
        Some(RAIN_DELAY_ERROR) => MowerState::RainDelay,
        Some(code) if code > 0 => MowerState::Error,
        _ => status
            .and_then(MowerState::from_status_code)
            .unwrap_or(MowerState::Initializing),
    }
}

/// Entity availability.
///
/// With a "no error" code (`-1` or `0`) this follows `online`. Any other
/// code means the device is reporting, so the entity stays available. A
/// device that reports no error code at all is unavailable.
pub fn is_available(online: bool, error: Option<i64>) -> bool {
    match error {
        None => false,
        Some(-1 | 0) => online,
        Some(_) => true,
    }
}
