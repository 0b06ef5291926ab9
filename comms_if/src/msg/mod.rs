//! # Messages
//!
//! Definitions of the messages consumed and produced by the sim. All messages are serialised as
//! JSON when sent over the network.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod chassis;
pub mod localization;
pub mod planning;
pub mod routing;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Header common to all messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    /// Absolute time at which the message was produced.
    ///
    /// Units: seconds
    pub timestamp_sec: f64,

    /// Sequence number of this message within its stream
    pub sequence_num: u32,

    /// Name of the module which produced the message
    pub module_name: String,
}

/// A 3D vector or point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// An orientation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quaternion {
    pub qw: f64,
    pub qx: f64,
    pub qy: f64,
    pub qz: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Header {
    /// Create a new header.
    pub fn new(timestamp_sec: f64, sequence_num: u32, module_name: &str) -> Self {
        Self {
            timestamp_sec,
            sequence_num,
            module_name: module_name.into(),
        }
    }
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Default for Quaternion {
    /// The identity rotation
    fn default() -> Self {
        Self {
            qw: 1.0,
            qx: 0.0,
            qy: 0.0,
            qz: 0.0,
        }
    }
}
