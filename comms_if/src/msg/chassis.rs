//! # Chassis Messages
//!
//! Low level vehicle status.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Header;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Status of the vehicle chassis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chassis {
    pub header: Header,

    pub engine_started: bool,

    pub driving_mode: DrivingMode,

    pub gear_location: GearPosition,

    /// Units: meters/second
    pub speed_mps: f64,

    /// Units: percent, [0, 100]
    pub throttle_percentage: f64,

    /// Units: percent, [0, 100]
    pub brake_percentage: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrivingMode {
    CompleteManual,
    CompleteAutoDrive,
    EmergencyMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GearPosition {
    GearNeutral,
    GearDrive,
    GearReverse,
    GearParking,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DrivingMode {
    fn default() -> Self {
        DrivingMode::CompleteManual
    }
}

impl Default for GearPosition {
    fn default() -> Self {
        GearPosition::GearNeutral
    }
}
