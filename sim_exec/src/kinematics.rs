//! # Kinematics
//!
//! Converts a trajectory point into the full kinematic state of the vehicle in the map frame.
//!
//! The vehicle is treated as a point moving along the path with no slip: velocity and
//! acceleration are the tangential speed and acceleration resolved along the heading, and the yaw
//! rate is speed times curvature. No centripetal term is added to the acceleration.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;

use comms_if::msg::{localization::Pose, planning::TrajectoryPoint, Point3D, Quaternion};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Kinematic state of the vehicle in the map frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KinematicState {
    /// Units: meters
    pub position_m: Vector3<f64>,

    /// Units: radians
    pub heading_rad: f64,

    /// Yaw-only rotation about the map Z axis.
    pub attitude_q: UnitQuaternion<f64>,

    /// Units: meters/second
    pub linear_velocity_ms: Vector3<f64>,

    /// Units: radians/second
    pub angular_velocity_rads: Vector3<f64>,

    /// Units: meters/second^2
    pub linear_accel_mss: Vector3<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl KinematicState {
    /// Compute the kinematic state at the given point.
    pub fn from_point(point: &TrajectoryPoint) -> Self {
        Self::from_point_with_yaw_offset(point, 0.0)
    }

    /// Compute the kinematic state at the given point, adding `yaw_offset_rad` to the heading
    /// when building the attitude.
    ///
    /// The offset only affects the quaternion. It is for orientation consumers whose zero yaw is
    /// not along the map X axis.
    pub fn from_point_with_yaw_offset(point: &TrajectoryPoint, yaw_offset_rad: f64) -> Self {
        let pp = &point.path_point;
        let (sin_h, cos_h) = pp.theta.sin_cos();

        Self {
            position_m: Vector3::new(pp.x, pp.y, 0.0),
            heading_rad: pp.theta,
            attitude_q: UnitQuaternion::from_euler_angles(0.0, 0.0, pp.theta + yaw_offset_rad),
            linear_velocity_ms: Vector3::new(point.v * cos_h, point.v * sin_h, 0.0),
            angular_velocity_rads: Vector3::new(0.0, 0.0, point.v * pp.kappa),
            linear_accel_mss: Vector3::new(point.a * cos_h, point.a * sin_h, 0.0),
        }
    }

    /// Convert into a localization pose.
    pub fn to_pose(&self) -> Pose {
        let q = self.attitude_q.quaternion();

        Pose {
            position: to_point3d(&self.position_m),
            heading: self.heading_rad,
            orientation: Quaternion {
                qw: q.w,
                qx: q.i,
                qy: q.j,
                qz: q.k,
            },
            linear_velocity: to_point3d(&self.linear_velocity_ms),
            angular_velocity: to_point3d(&self.angular_velocity_rads),
            linear_acceleration: to_point3d(&self.linear_accel_mss),
        }
    }
}

fn to_point3d(v: &Vector3<f64>) -> Point3D {
    Point3D::new(v.x, v.y, v.z)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
