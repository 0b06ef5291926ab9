//! Parameters structure for the vehicle emulator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters mapping acceleration onto pedal positions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- THROTTLE ----

    /// Throttle demanded per unit of positive acceleration.
    ///
    /// Units: percent/(meters/second^2)
    pub throttle_pct_per_mss: f64,

    /// Upper limit on the throttle.
    ///
    /// Units: percent
    pub max_throttle_pct: f64,

    // ---- BRAKE ----

    /// Brake demanded per unit of negative acceleration.
    ///
    /// Units: percent/(meters/second^2)
    pub brake_pct_per_mss: f64,

    /// Upper limit on the brake.
    ///
    /// Units: percent
    pub max_brake_pct: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            throttle_pct_per_mss: 25.0,
            max_throttle_pct: 100.0,
            brake_pct_per_mss: 12.5,
            max_brake_pct: 100.0,
        }
    }
}
