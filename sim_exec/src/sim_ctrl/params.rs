//! Parameters structure for SimCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use comms_if::msg::planning::TrajectoryPoint;

use crate::vehicle;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for sim control.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- EXECUTION ----

    /// If false the sim starts disabled and publishes nothing until enabled.
    pub enabled: bool,

    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    // ---- STATE SYNTHESIS ----

    /// Added to the heading when building the orientation quaternion.
    ///
    /// Units: radians
    pub orientation_yaw_offset_rad: f64,

    /// Maximum distance between the start point and the first point of the first trajectory
    /// after a reset before a warning is raised.
    ///
    /// Units: meters
    pub start_point_tolerance_m: f64,

    /// Pedal map for the vehicle emulator.
    pub vehicle: vehicle::Params,

    /// Start point installed at initialisation, if any.
    pub start_point: Option<TrajectoryPoint>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            enabled: true,
            cycle_period_s: 0.1,
            orientation_yaw_offset_rad: 0.0,
            start_point_tolerance_m: 1.0,
            vehicle: vehicle::Params::default(),
            start_point: None,
        }
    }
}

impl Params {
    /// Check that the parameters are usable, returning a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.cycle_period_s.is_finite() && self.cycle_period_s > 0.0) {
            return Err(format!(
                "cycle_period_s must be positive, got {}",
                self.cycle_period_s
            ));
        }

        if !self.orientation_yaw_offset_rad.is_finite() {
            return Err("orientation_yaw_offset_rad must be finite".into());
        }

        if !(self.start_point_tolerance_m >= 0.0) {
            return Err(format!(
                "start_point_tolerance_m must be non-negative, got {}",
                self.start_point_tolerance_m
            ));
        }

        let v = &self.vehicle;
        for (name, val) in &[
            ("vehicle.throttle_pct_per_mss", v.throttle_pct_per_mss),
            ("vehicle.max_throttle_pct", v.max_throttle_pct),
            ("vehicle.brake_pct_per_mss", v.brake_pct_per_mss),
            ("vehicle.max_brake_pct", v.max_brake_pct),
        ] {
            if !(val.is_finite() && *val >= 0.0) {
                return Err(format!("{} must be finite and non-negative, got {}", name, val));
            }
        }

        if let Some(ref p) = self.start_point {
            if !p.is_finite() {
                return Err("start_point contains a non-finite value".into());
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_toml() {
        let params: Params = util::params::from_str(
            r#"
            enabled = true
            cycle_period_s = 0.05
            orientation_yaw_offset_rad = -1.5707963267948966

            [vehicle]
            throttle_pct_per_mss = 20.0
            max_brake_pct = 80.0

            [start_point]
            v = 0.0

            [start_point.path_point]
            x = 10.0
            y = -4.0
            theta = 1.0
            "#,
        )
        .unwrap();

        assert_eq!(params.cycle_period_s, 0.05);
        assert_eq!(params.vehicle.throttle_pct_per_mss, 20.0);
        assert_eq!(params.vehicle.brake_pct_per_mss, 12.5);
        assert_eq!(params.vehicle.max_brake_pct, 80.0);
        assert_eq!(params.start_point_tolerance_m, 1.0);

        let sp = params.start_point.unwrap();
        assert_eq!(sp.path_point.x, 10.0);
        assert_eq!(sp.path_point.theta, 1.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_shipped_params() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("params")
            .join("sim_ctrl.toml");
        let params: Params = util::params::load_path(path).unwrap();

        assert!(params.validate().is_ok());
        assert_eq!(params.cycle_period_s, 0.1);
        assert!(params.start_point.is_some());
    }

    #[test]
    fn test_validate() {
        assert!(Params::default().validate().is_ok());

        let bad = Params {
            cycle_period_s: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let mut bad = Params::default();
        bad.vehicle.brake_pct_per_mss = -1.0;
        assert!(bad.validate().is_err());
    }
}
