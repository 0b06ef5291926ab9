//! # Routing Messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Header;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pose the route passes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Waypoint {
    /// Units: meters, frame: map
    pub x: f64,
    pub y: f64,

    /// Units: radians
    pub heading: f64,
}

/// A route computed by the routing stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingResponse {
    pub header: Header,

    /// Waypoints of the request the route answers, starting with the vehicle's start pose.
    pub waypoints: Vec<Waypoint>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RoutingResponse {
    /// A route needs at least a start and an end waypoint.
    pub fn is_valid(&self) -> bool {
        self.waypoints.len() >= 2
    }

    /// The waypoint the route starts at.
    pub fn start(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }
}
