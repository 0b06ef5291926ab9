//! # Telecommand module
//!
//! Commands accepted by the sim. These carry the planning and routing outputs into the sim as
//! well as the operator's start point, reset and enable requests.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use crate::msg::{
    planning::{AdcTrajectory, TrajectoryPoint},
    routing::RoutingResponse,
};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand sent to the sim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tc {
    /// A new trajectory from the planning stack
    Planning(AdcTrajectory),

    /// A new route from the routing stack
    Routing(RoutingResponse),

    /// Set the point the vehicle sits at until a trajectory arrives
    SetStartPoint(TrajectoryPoint),

    /// Drop the active trajectory and go back to the start point
    Reset,

    /// Start emulating the vehicle
    Enable,

    /// Stop emulating the vehicle, nothing will be published until re-enabled
    Disable,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Could not serialize the TC: {0}")]
    SerializationError(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a TC from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialize the TC into a JSON string.
    pub fn to_json(&self) -> Result<String, TcParseError> {
        serde_json::to_string(self).map_err(TcParseError::SerializationError)
    }

    /// Short name of the TC, used when logging.
    pub fn name(&self) -> &'static str {
        match self {
            Tc::Planning(_) => "Planning",
            Tc::Routing(_) => "Routing",
            Tc::SetStartPoint(_) => "SetStartPoint",
            Tc::Reset => "Reset",
            Tc::Enable => "Enable",
            Tc::Disable => "Disable",
        }
    }
}
