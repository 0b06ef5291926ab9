//! # Localization Messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{Header, Point3D, Quaternion};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Full pose of the vehicle in the map frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pose {
    /// Units: meters
    pub position: Point3D,

    /// Heading, measured anticlockwise from the map X axis.
    ///
    /// Units: radians
    pub heading: f64,

    pub orientation: Quaternion,

    /// Units: meters/second
    pub linear_velocity: Point3D,

    /// Units: radians/second
    pub angular_velocity: Point3D,

    /// Units: meters/second^2
    pub linear_acceleration: Point3D,
}

/// An estimate of where the vehicle is and how it is moving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationEstimate {
    pub header: Header,

    pub pose: Pose,
}
