//! # Start Point Manager
//!
//! Holds the seed pose used before the first trajectory arrives, and again after a reset.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Mutex, PoisonError};

use log::info;

use comms_if::msg::planning::TrajectoryPoint;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct StartPointManager {
    seed: Mutex<Option<TrajectoryPoint>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StartPointManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new seed, replacing any previous one.
    pub fn set_start_point(&self, point: TrajectoryPoint) {
        info!(
            "Start point set to ({:.3}, {:.3}) m, heading {:.3} rad",
            point.path_point.x, point.path_point.y, point.path_point.theta
        );

        *self.seed.lock().unwrap_or_else(PoisonError::into_inner) = Some(point);
    }

    /// Get the current seed, if one has been set.
    pub fn seed(&self) -> Option<TrajectoryPoint> {
        *self.seed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_set(&self) -> bool {
        self.seed().is_some()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
