//! # Trajectory Store
//!
//! Holds the trajectory the sim is currently replaying. Trajectories are validated on the way in
//! and, once accepted, are immutable: replacing the active trajectory swaps the shared pointer so
//! a reader holding a snapshot keeps seeing the trajectory it took, in full.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

use comms_if::msg::{
    planning::{AdcTrajectory, TrajectoryPoint},
    Header,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A validated trajectory.
///
/// Invariants:
/// - at least one point,
/// - every numeric field is finite,
/// - `relative_time` strictly increases,
/// - `s` never decreases.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    header: Header,
    points: Vec<TrajectoryPoint>,
    estop: bool,
}

/// Thread safe holder of the active trajectory.
#[derive(Debug, Default)]
pub struct TrajectoryStore {
    active: Mutex<Option<Arc<Trajectory>>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Reasons a trajectory is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrajectoryError {
    #[error("The trajectory contains no points")]
    Empty,

    #[error("The trajectory reference timestamp is not finite ({0})")]
    NonFiniteTimestamp(f64),

    #[error("Trajectory point {0} contains a non-finite value")]
    NonFinitePoint(usize),

    #[error(
        "Relative time of trajectory point {index} ({time_s} s) is not after the previous \
         point ({prev_time_s} s)"
    )]
    TimeNotIncreasing {
        index: usize,
        time_s: f64,
        prev_time_s: f64,
    },

    #[error(
        "Arc length of trajectory point {index} ({s_m} m) is less than the previous point \
         ({prev_s_m} m)"
    )]
    ArcLengthDecreasing { index: usize, s_m: f64, prev_s_m: f64 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Trajectory {
    /// Validate a planning message and build a trajectory from it.
    pub fn from_msg(msg: AdcTrajectory) -> Result<Self, TrajectoryError> {
        let traj = Self {
            header: msg.header,
            points: msg.trajectory_point,
            estop: msg.estop.is_estop,
        };

        traj.validate()?;

        Ok(traj)
    }

    /// Build a trajectory from a reference time and a list of points.
    pub fn new(reference_time_s: f64, points: Vec<TrajectoryPoint>) -> Result<Self, TrajectoryError> {
        Self::from_msg(AdcTrajectory {
            header: Header::new(reference_time_s, 0, "planning"),
            trajectory_point: points,
            ..Default::default()
        })
    }

    /// Absolute time at which `relative_time == 0`.
    pub fn reference_time_s(&self) -> f64 {
        self.header.timestamp_sec
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn first(&self) -> &TrajectoryPoint {
        // Never empty once validated
        &self.points[0]
    }

    pub fn last(&self) -> &TrajectoryPoint {
        &self.points[self.points.len() - 1]
    }

    /// Relative time of the last point.
    pub fn end_time_s(&self) -> f64 {
        self.last().relative_time
    }

    /// Whether the planner has requested an emergency stop.
    pub fn is_estop(&self) -> bool {
        self.estop
    }

    /// Check the trajectory's invariants.
    fn validate(&self) -> Result<(), TrajectoryError> {
        if self.points.is_empty() {
            return Err(TrajectoryError::Empty);
        }

        if !self.header.timestamp_sec.is_finite() {
            return Err(TrajectoryError::NonFiniteTimestamp(self.header.timestamp_sec));
        }

        for (i, point) in self.points.iter().enumerate() {
            if !point.is_finite() {
                return Err(TrajectoryError::NonFinitePoint(i));
            }
        }

        for (i, pair) in self.points.windows(2).enumerate() {
            let (prev, curr) = (&pair[0], &pair[1]);

            if curr.relative_time <= prev.relative_time {
                return Err(TrajectoryError::TimeNotIncreasing {
                    index: i + 1,
                    time_s: curr.relative_time,
                    prev_time_s: prev.relative_time,
                });
            }

            if curr.path_point.s < prev.path_point.s {
                return Err(TrajectoryError::ArcLengthDecreasing {
                    index: i + 1,
                    s_m: curr.path_point.s,
                    prev_s_m: prev.path_point.s,
                });
            }
        }

        Ok(())
    }
}

impl TrajectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and install a planning message as the active trajectory.
    ///
    /// Rejected messages are logged and dropped, leaving the previous trajectory active.
    pub fn accept(&self, msg: AdcTrajectory) -> Result<Arc<Trajectory>, TrajectoryError> {
        let seq = msg.header.sequence_num;

        match Trajectory::from_msg(msg) {
            Ok(traj) => {
                let traj = Arc::new(traj);
                self.replace(traj.clone());
                Ok(traj)
            }
            Err(e) => {
                warn!("Trajectory #{} rejected: {}", seq, e);
                Err(e)
            }
        }
    }

    /// Install a new active trajectory, returning the one it replaced.
    pub fn replace(&self, traj: Arc<Trajectory>) -> Option<Arc<Trajectory>> {
        debug!(
            "Installing trajectory #{} ({} points, reference time {:.3} s)",
            traj.header().sequence_num,
            traj.points().len(),
            traj.reference_time_s()
        );

        self.lock().replace(traj)
    }

    /// Get the active trajectory, if there is one.
    ///
    /// The snapshot is unaffected by later replacements.
    pub fn snapshot(&self) -> Option<Arc<Trajectory>> {
        self.lock().clone()
    }

    /// Remove the active trajectory, returning it.
    pub fn clear(&self) -> Option<Arc<Trajectory>> {
        self.lock().take()
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<Trajectory>>> {
        // The guarded value is only ever swapped whole, so a poisoned lock still holds a
        // consistent value
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
