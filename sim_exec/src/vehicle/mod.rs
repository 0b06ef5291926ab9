//! # Vehicle Emulator
//!
//! Derives the chassis status a real vehicle would report while following a trajectory point.
//! There is no engine or tyre model: speed is taken directly from the point and the pedal
//! positions are a clamped linear map of the acceleration.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
pub use params::*;
use comms_if::msg::{
    chassis::{Chassis, DrivingMode, GearPosition},
    planning::TrajectoryPoint,
    Header,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Vehicle emulator, holding the pedal map.
#[derive(Debug, Clone, Default)]
pub struct VehicleEmulator {
    params: Params,
}

/// Chassis facing state of the vehicle for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChassisState {
    pub engine_started: bool,

    pub driving_mode: DrivingMode,

    pub gear: GearPosition,

    /// Units: meters/second
    pub speed_mps: f64,

    /// Units: percent
    pub throttle_pct: f64,

    /// Units: percent
    pub brake_pct: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VehicleEmulator {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Derive the chassis state at the given point.
    ///
    /// `traj_active` selects between autonomous driving (following a trajectory) and manual mode
    /// (sitting at the start point waiting for one).
    ///
    /// Gear is `GearDrive` for `v >= 0` and `GearReverse` for `v < 0`, so a stationary vehicle
    /// reports drive.
    pub fn derive(&self, point: &TrajectoryPoint, traj_active: bool) -> ChassisState {
        let (throttle_pct, brake_pct) = self.pedals(point.a);

        ChassisState {
            engine_started: true,
            driving_mode: match traj_active {
                true => DrivingMode::CompleteAutoDrive,
                false => DrivingMode::CompleteManual,
            },
            gear: if point.v < 0.0 {
                GearPosition::GearReverse
            } else {
                GearPosition::GearDrive
            },
            speed_mps: point.v,
            throttle_pct,
            brake_pct,
        }
    }

    /// Map an acceleration onto (throttle, brake) percentages. At most one is non-zero.
    fn pedals(&self, accel_mss: f64) -> (f64, f64) {
        let p = &self.params;

        if accel_mss > 0.0 {
            ((accel_mss * p.throttle_pct_per_mss).min(p.max_throttle_pct), 0.0)
        } else if accel_mss < 0.0 {
            (0.0, (-accel_mss * p.brake_pct_per_mss).min(p.max_brake_pct))
        } else {
            (0.0, 0.0)
        }
    }
}

impl ChassisState {
    /// Build the outbound chassis message.
    pub fn to_msg(&self, header: Header) -> Chassis {
        Chassis {
            header,
            engine_started: self.engine_started,
            driving_mode: self.driving_mode,
            gear_location: self.gear,
            speed_mps: self.speed_mps,
            throttle_percentage: self.throttle_pct,
            brake_percentage: self.brake_pct,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn point(v: f64, a: f64) -> TrajectoryPoint {
        TrajectoryPoint {
            v,
            a,
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_accel() {
        let emu = VehicleEmulator::default();
        let state = emu.derive(&point(10.0, 0.0), true);

        assert_eq!(state.throttle_pct, 0.0);
        assert_eq!(state.brake_pct, 0.0);
        assert_eq!(state.speed_mps, 10.0);
        assert_eq!(state.gear, GearPosition::GearDrive);
        assert_eq!(state.driving_mode, DrivingMode::CompleteAutoDrive);
        assert!(state.engine_started);
    }

    #[test]
    fn test_pedal_map() {
        let emu = VehicleEmulator::default();

        let state = emu.derive(&point(5.0, 2.0), true);
        assert_eq!(state.throttle_pct, 50.0);
        assert_eq!(state.brake_pct, 0.0);

        let state = emu.derive(&point(5.0, -2.0), true);
        assert_eq!(state.throttle_pct, 0.0);
        assert_eq!(state.brake_pct, 25.0);

        // Saturation
        let state = emu.derive(&point(5.0, 10.0), true);
        assert_eq!(state.throttle_pct, 100.0);
        let state = emu.derive(&point(5.0, -20.0), true);
        assert_eq!(state.brake_pct, 100.0);

        let emu = VehicleEmulator::new(Params {
            max_throttle_pct: 40.0,
            ..Default::default()
        });
        let state = emu.derive(&point(5.0, 2.0), true);
        assert_eq!(state.throttle_pct, 40.0);
    }

    #[test]
    fn test_gear() {
        let emu = VehicleEmulator::default();

        assert_eq!(emu.derive(&point(-1.5, 0.0), true).gear, GearPosition::GearReverse);
        assert_eq!(emu.derive(&point(-1.5, 0.0), true).speed_mps, -1.5);
        assert_eq!(emu.derive(&point(0.0, 0.0), true).gear, GearPosition::GearDrive);
    }

    #[test]
    fn test_awaiting_is_manual() {
        let emu = VehicleEmulator::default();
        let state = emu.derive(&point(0.0, 0.0), false);

        assert_eq!(state.driving_mode, DrivingMode::CompleteManual);

        let msg = state.to_msg(Header::new(1.0, 3, "chassis"));
        assert_eq!(msg.header.sequence_num, 3);
        assert_eq!(msg.driving_mode, DrivingMode::CompleteManual);
        assert_eq!(msg.gear_location, GearPosition::GearDrive);
    }
}
