//! # Planning Messages
//!
//! The trajectory produced by the planning stack, which the sim replays.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::Header;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A point on a path in the map frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathPoint {
    /// Position in the map frame.
    ///
    /// Units: meters
    pub x: f64,
    pub y: f64,

    /// Arc length from the start of the path.
    ///
    /// Units: meters
    pub s: f64,

    /// Heading, measured anticlockwise from the map X axis.
    ///
    /// Units: radians
    pub theta: f64,

    /// Curvature of the path at this point.
    ///
    /// Units: 1/meters
    pub kappa: f64,
}

/// A path point with motion information attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryPoint {
    pub path_point: PathPoint,

    /// Speed along the path.
    ///
    /// Units: meters/second
    pub v: f64,

    /// Tangential acceleration.
    ///
    /// Units: meters/second^2
    pub a: f64,

    /// Time since the trajectory's reference timestamp.
    ///
    /// Units: seconds
    pub relative_time: f64,
}

/// Emergency stop information attached to a trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EStop {
    /// If true the vehicle must stop where it is
    pub is_estop: bool,

    /// Why the emergency stop was raised
    pub reason: String,
}

/// A trajectory produced by the planning stack.
///
/// The header timestamp is the reference time at which `relative_time == 0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdcTrajectory {
    pub header: Header,

    /// The trajectory points, ordered by `relative_time`
    pub trajectory_point: Vec<TrajectoryPoint>,

    pub estop: EStop,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TrajectoryPoint {
    /// Build a stationary point at the given position and heading.
    pub fn stationary(x: f64, y: f64, theta: f64) -> Self {
        Self {
            path_point: PathPoint {
                x,
                y,
                theta,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Returns true if every numeric field of the point is finite.
    pub fn is_finite(&self) -> bool {
        let p = &self.path_point;
        [
            p.x,
            p.y,
            p.s,
            p.theta,
            p.kappa,
            self.v,
            self.a,
            self.relative_time,
        ]
        .iter()
        .all(|f| f.is_finite())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_trajectory_json() {
        let json = r#"{
            "header": {"timestamp_sec": 100.0, "sequence_num": 3, "module_name": "planning"},
            "trajectory_point": [
                {"path_point": {"x": 1.0, "y": 2.0, "theta": 0.5}, "v": 3.0, "relative_time": 0.0},
                {"path_point": {"x": 1.5, "y": 2.0, "s": 0.5}, "v": 3.0, "relative_time": 0.1}
            ]
        }"#;

        let traj: AdcTrajectory = serde_json::from_str(json).unwrap();

        assert_eq!(traj.header.timestamp_sec, 100.0);
        assert_eq!(traj.header.sequence_num, 3);
        assert_eq!(traj.trajectory_point.len(), 2);
        assert_eq!(traj.trajectory_point[0].path_point.theta, 0.5);
        assert_eq!(traj.trajectory_point[0].path_point.kappa, 0.0);
        assert_eq!(traj.trajectory_point[1].relative_time, 0.1);
        assert!(!traj.estop.is_estop);
    }

    #[test]
    fn test_point_is_finite() {
        let mut p = TrajectoryPoint::stationary(1.0, 2.0, 0.0);
        assert!(p.is_finite());

        p.a = std::f64::INFINITY;
        assert!(!p.is_finite());

        p.a = 0.0;
        p.path_point.kappa = std::f64::NAN;
        assert!(!p.is_finite());
    }
}
