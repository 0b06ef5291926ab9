//! # Sim Control
//!
//! Synthesises the vehicle's state once per control cycle, either from the active trajectory or,
//! before one has arrived, from the start point.
//!
//! The module runs through three states:
//!
//! ```text
//!  Disabled --init(true)/enable--> AwaitingTrajectory --trajectory--> Running
//!                                         ^                              |
//!                                         +------------reset-------------+
//! ```
//!
//! Inbound messages reach the module through a [`SimCtrlHandle`], which may be cloned and moved
//! to the transport thread. The cyclic processing itself goes through the `State` trait.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Module name placed in the chassis message header.
pub const CHASSIS_MODULE_NAME: &str = "chassis";

/// Module name placed in the localization message header.
pub const LOCALIZATION_MODULE_NAME: &str = "localization";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The operating state of sim control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimState {
    /// Nothing is published.
    Disabled,

    /// Enabled, holding the vehicle at the start point until a trajectory arrives.
    AwaitingTrajectory,

    /// Replaying the active trajectory.
    Running,
}

impl Default for SimState {
    fn default() -> Self {
        SimState::Disabled
    }
}

/// Possible errors that can occur during SimCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SimCtrlError {
    #[error("Invalid sim control parameters: {0}")]
    InvalidParams(String),

    #[error("No start point has been set, cannot synthesise a state before the first trajectory")]
    NoStartPoint,

    #[error("The start point contains a non-finite value")]
    InvalidStartPoint,

    #[error("Routing response must contain at least 2 waypoints, found {0}")]
    InvalidRouting(usize),

    #[error("The clock returned a non-finite time ({0})")]
    InvalidTime(f64),
}
