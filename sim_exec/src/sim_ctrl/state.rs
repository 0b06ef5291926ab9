//! Implementations for the SimCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};

use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::{Params, SimCtrlError, SimState, CHASSIS_MODULE_NAME, LOCALIZATION_MODULE_NAME};
use crate::{
    interp::interpolate,
    kinematics::KinematicState,
    start_point::StartPointManager,
    tm::SimTm,
    traj_store::{TrajectoryError, TrajectoryStore},
    vehicle::VehicleEmulator,
};
use comms_if::msg::{
    localization::LocalizationEstimate,
    planning::{AdcTrajectory, TrajectoryPoint},
    routing::RoutingResponse,
    Header,
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Sim control module state.
pub struct SimCtrl {
    params: Params,

    shared: Arc<Shared>,

    vehicle: VehicleEmulator,

    /// Sequence number of the next telemetry pair.
    tm_seq: u32,

    /// State seen by the previous cycle, for logging transitions.
    prev_state: SimState,

    /// Point published by the previous cycle. An emergency stop holds the vehicle here.
    last_point: Option<TrajectoryPoint>,

    pub(crate) report: StatusReport,
}

/// Cloneable handle through which inbound messages reach sim control.
#[derive(Clone)]
pub struct SimCtrlHandle {
    shared: Arc<Shared>,
}

/// Input data to sim control.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Clock time of this cycle.
    ///
    /// Units: seconds
    pub time_s: f64,
}

/// Status report for sim control processing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    pub state: SimState,

    /// Time since the active trajectory's reference time, if running.
    ///
    /// Units: seconds
    pub elapsed_s: Option<f64>,

    /// True if the elapsed time is past the end of the active trajectory and the final point is
    /// being held.
    pub traj_exhausted: bool,

    /// True if the active trajectory requested an emergency stop.
    pub estop: bool,

    /// Sequence number of the active trajectory.
    pub traj_seq: Option<u32>,
}

/// State shared between the cyclic processing and the handles.
struct Shared {
    enabled: AtomicBool,

    store: TrajectoryStore,

    start_point: StartPointManager,

    /// Header of the last accepted routing response.
    routing: Mutex<Option<Header>>,

    /// Set on reset, cleared by the next accepted trajectory.
    check_start_offset: AtomicBool,

    start_point_tolerance_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimCtrl {
    /// Create a new, disabled, instance of sim control.
    pub fn new(params: Params) -> Self {
        let shared = Arc::new(Shared {
            enabled: AtomicBool::new(false),
            store: TrajectoryStore::new(),
            start_point: StartPointManager::new(),
            routing: Mutex::new(None),
            check_start_offset: AtomicBool::new(true),
            start_point_tolerance_m: params.start_point_tolerance_m,
        });

        Self {
            vehicle: VehicleEmulator::new(params.vehicle.clone()),
            params,
            shared,
            tm_seq: 0,
            prev_state: SimState::Disabled,
            last_point: None,
            report: StatusReport::default(),
        }
    }

    /// Get a handle for delivering inbound messages.
    pub fn handle(&self) -> SimCtrlHandle {
        SimCtrlHandle {
            shared: self.shared.clone(),
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn state(&self) -> SimState {
        self.shared.state()
    }

    /// Log any change of state since the previous cycle.
    fn log_transition(&mut self, state: SimState) {
        if state != self.prev_state {
            info!("SimCtrl state {:?} -> {:?}", self.prev_state, state);
            self.prev_state = state;
        }
    }
}

impl State for SimCtrl {
    /// Whether the sim starts enabled.
    type InitData = bool;
    type InitError = SimCtrlError;

    type InputData = InputData;
    /// Telemetry for this cycle, or `None` while disabled.
    type OutputData = Option<SimTm>;
    type StatusReport = StatusReport;
    type ProcError = SimCtrlError;

    /// Initialise sim control.
    ///
    /// With `init_data = false` the sim stays disabled (passive mode).
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.params.validate().map_err(SimCtrlError::InvalidParams)?;

        if let Some(point) = self.params.start_point {
            self.shared.start_point.set_start_point(point);
        }

        self.shared.enabled.store(init_data, Ordering::SeqCst);

        let state = self.state();
        self.log_transition(state);

        Ok(())
    }

    /// Synthesise the vehicle state for one cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();

        if !input_data.time_s.is_finite() {
            return Err(SimCtrlError::InvalidTime(input_data.time_s));
        }

        // Enabled flag is read exactly once per cycle
        if !self.shared.enabled.load(Ordering::SeqCst) {
            self.log_transition(SimState::Disabled);
            return Ok((None, self.report.clone()));
        }

        let (point, traj_active) = match self.shared.store.snapshot() {
            Some(traj) => {
                let elapsed_s = input_data.time_s - traj.reference_time_s();
                let mut point = match (traj.is_estop(), self.last_point) {
                    (true, Some(held)) => held,
                    _ => interpolate(&traj, elapsed_s),
                };

                if traj.is_estop() {
                    point.v = 0.0;
                    point.a = 0.0;
                }

                self.report.state = SimState::Running;
                self.report.elapsed_s = Some(elapsed_s);
                self.report.traj_exhausted = elapsed_s >= traj.end_time_s();
                self.report.estop = traj.is_estop();
                self.report.traj_seq = Some(traj.header().sequence_num);

                (point, true)
            }
            None => {
                let seed = self
                    .shared
                    .start_point
                    .seed()
                    .ok_or(SimCtrlError::NoStartPoint)?;

                self.report.state = SimState::AwaitingTrajectory;

                (seed, false)
            }
        };

        self.log_transition(self.report.state);

        let kin =
            KinematicState::from_point_with_yaw_offset(&point, self.params.orientation_yaw_offset_rad);
        let chassis = self.vehicle.derive(&point, traj_active);

        trace!(
            "Sim state: pos ({:.3}, {:.3}) m, heading {:.3} rad, speed {:.3} m/s, accel {:.3} m/s^2",
            point.path_point.x,
            point.path_point.y,
            point.path_point.theta,
            point.v,
            point.a
        );

        self.last_point = Some(point);

        let seq = self.tm_seq;
        self.tm_seq = self.tm_seq.wrapping_add(1);

        let tm = SimTm {
            chassis: chassis.to_msg(Header::new(input_data.time_s, seq, CHASSIS_MODULE_NAME)),
            localization: LocalizationEstimate {
                header: Header::new(input_data.time_s, seq, LOCALIZATION_MODULE_NAME),
                pose: kin.to_pose(),
            },
        };

        Ok((Some(tm), self.report.clone()))
    }
}

impl SimCtrlHandle {
    /// Current state of sim control.
    pub fn state(&self) -> SimState {
        self.shared.state()
    }

    /// Validate and install a new trajectory.
    ///
    /// Returns `Ok(true)` if the trajectory is now active, `Ok(false)` if it was ignored because
    /// the sim is disabled. Rejected trajectories leave the previous one active.
    pub fn on_trajectory(&self, msg: AdcTrajectory) -> Result<bool, TrajectoryError> {
        if !self.is_enabled() {
            debug!(
                "Sim disabled, ignoring trajectory #{}",
                msg.header.sequence_num
            );
            return Ok(false);
        }

        let traj = self.shared.store.accept(msg)?;

        if traj.is_estop() {
            warn!("Trajectory #{} requests an emergency stop", traj.header().sequence_num);
        }

        // First trajectory since a reset should begin near the start point
        if self.shared.check_start_offset.swap(false, Ordering::SeqCst) {
            if let Some(seed) = self.shared.start_point.seed() {
                let first = &traj.first().path_point;
                let offset_m = (first.x - seed.path_point.x).hypot(first.y - seed.path_point.y);

                if offset_m > self.shared.start_point_tolerance_m {
                    warn!(
                        "First point of trajectory #{} is {:.3} m from the start point \
                         (tolerance {:.3} m)",
                        traj.header().sequence_num,
                        offset_m,
                        self.shared.start_point_tolerance_m
                    );
                }
            }
        }

        Ok(true)
    }

    /// Handle a routing response.
    ///
    /// Routing is informational: the header is recorded and, while no trajectory is active, the
    /// start point is moved to the start of the route. An active trajectory is never affected.
    pub fn on_routing(&self, msg: RoutingResponse) -> Result<(), SimCtrlError> {
        if !self.is_enabled() {
            debug!("Sim disabled, ignoring routing #{}", msg.header.sequence_num);
            return Ok(());
        }

        if !msg.is_valid() {
            warn!(
                "Routing #{} rejected: only {} waypoint(s)",
                msg.header.sequence_num,
                msg.waypoints.len()
            );
            return Err(SimCtrlError::InvalidRouting(msg.waypoints.len()));
        }

        {
            let mut routing = self
                .shared
                .routing
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            let changed = match *routing {
                Some(ref prev) => {
                    prev.sequence_num != msg.header.sequence_num
                        || prev.timestamp_sec != msg.header.timestamp_sec
                }
                None => true,
            };

            if changed {
                info!(
                    "Routing changed to #{} ({} waypoints)",
                    msg.header.sequence_num,
                    msg.waypoints.len()
                );
            }

            *routing = Some(msg.header.clone());
        }

        if self.state() == SimState::AwaitingTrajectory {
            if let Some(start) = msg.start() {
                let point = TrajectoryPoint::stationary(start.x, start.y, start.heading);
                if !point.is_finite() {
                    return Err(SimCtrlError::InvalidStartPoint);
                }
                self.shared.start_point.set_start_point(point);
            }
        }

        Ok(())
    }

    /// Header of the most recent routing response.
    pub fn routing_header(&self) -> Option<Header> {
        self.shared
            .routing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Set the start point.
    ///
    /// Returns `Ok(false)` if the point was ignored because the sim is disabled.
    pub fn set_start_point(&self, point: TrajectoryPoint) -> Result<bool, SimCtrlError> {
        if !self.is_enabled() {
            debug!("Sim disabled, ignoring start point");
            return Ok(false);
        }

        if !point.is_finite() {
            warn!("Start point rejected: contains a non-finite value");
            return Err(SimCtrlError::InvalidStartPoint);
        }

        self.shared.start_point.set_start_point(point);

        Ok(true)
    }

    /// Clear the active trajectory, returning to the start point. The start point is kept.
    pub fn reset(&self) {
        let prev = self.shared.store.clear();
        self.shared.check_start_offset.store(true, Ordering::SeqCst);

        match prev {
            Some(traj) => info!(
                "Sim reset, trajectory #{} cleared",
                traj.header().sequence_num
            ),
            None => info!("Sim reset"),
        }
    }

    /// Enable or disable the sim. Takes effect from the next cycle.
    pub fn set_enabled(&self, enabled: bool) {
        let was = self.shared.enabled.swap(enabled, Ordering::SeqCst);

        if was != enabled {
            info!("Sim {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::SeqCst)
    }
}

impl Shared {
    fn state(&self) -> SimState {
        if !self.enabled.load(Ordering::SeqCst) {
            SimState::Disabled
        } else if self.store.is_active() {
            SimState::Running
        } else {
            SimState::AwaitingTrajectory
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
