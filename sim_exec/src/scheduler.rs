//! # Control Loop Scheduler
//!
//! Drives sim control at a fixed period. Each cycle reads the clock once, synthesises the vehicle
//! state and publishes the chassis and localization records together.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use util::module::State;

use crate::{
    clock::Clock,
    sim_ctrl::{self, InputData, SimCtrl, SimCtrlError, SimCtrlHandle, StatusReport},
    tm::{PublishError, TmPublisher},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct SimScheduler<P: TmPublisher> {
    sim_ctrl: SimCtrl,

    clock: Arc<dyn Clock>,

    publisher: P,

    period: Duration,

    stats: SchedulerStats,

    /// Number of consecutive cycles which returned an error.
    num_consec_errors: u64,
}

/// Counters kept over the life of the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub num_cycles: u64,
    pub num_published: u64,
    pub num_overruns: u64,
    pub num_sim_errors: u64,
    pub num_publish_errors: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Sim control error: {0}")]
    Sim(SimCtrlError),

    #[error("Publish failed: {0}")]
    Publish(PublishError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<P: TmPublisher> SimScheduler<P> {
    /// Create a scheduler around an initialised sim control instance.
    ///
    /// The cycle period is taken from the sim control parameters.
    pub fn new(sim_ctrl: SimCtrl, clock: Arc<dyn Clock>, publisher: P) -> Self {
        // Params are validated by `SimCtrl::init`, fall back to the default for an uninitialised
        // instance
        let period_s = match sim_ctrl.params().cycle_period_s {
            p if p.is_finite() && p > 0.0 => p,
            _ => sim_ctrl::Params::default().cycle_period_s,
        };
        let period = Duration::from_secs_f64(period_s);

        Self {
            sim_ctrl,
            clock,
            publisher,
            period,
            stats: SchedulerStats::default(),
            num_consec_errors: 0,
        }
    }

    pub fn handle(&self) -> SimCtrlHandle {
        self.sim_ctrl.handle()
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Execute a single control cycle.
    ///
    /// Nothing is published while disabled. Errors are returned for the caller to handle, the
    /// scheduler itself is left ready for the next cycle.
    pub fn run_once(&mut self) -> Result<StatusReport, SchedulerError> {
        self.stats.num_cycles += 1;

        let time_s = self.clock.now_s();

        let (tm, report) = match self.sim_ctrl.proc(&InputData { time_s }) {
            Ok(r) => r,
            Err(e) => {
                self.stats.num_sim_errors += 1;
                return Err(SchedulerError::Sim(e));
            }
        };

        if let Some(tm) = tm {
            if let Err(e) = self.publisher.publish(&tm) {
                self.stats.num_publish_errors += 1;
                return Err(SchedulerError::Publish(e));
            }
            self.stats.num_published += 1;
        }

        Ok(report)
    }

    /// Run cycles at the configured period until `max_cycles` have executed, or forever if
    /// `None`.
    pub fn run(&mut self, max_cycles: Option<u64>) {
        self.run_loop(None, max_cycles)
    }

    /// Run cycles at the configured period until `stop` is set or `max_cycles` have executed.
    pub fn run_until(&mut self, stop: &AtomicBool, max_cycles: Option<u64>) {
        self.run_loop(Some(stop), max_cycles)
    }

    fn run_loop(&mut self, stop: Option<&AtomicBool>, max_cycles: Option<u64>) {
        info!(
            "Starting control loop, period {:.03} s, {:?} clock",
            self.period.as_secs_f64(),
            self.clock.mode()
        );

        let mut cycles_this_run = 0u64;

        while !stop.map_or(false, |s| s.load(Ordering::SeqCst)) {
            if let Some(max) = max_cycles {
                if cycles_this_run >= max {
                    info!("Reached the maximum of {} cycles", max);
                    break;
                }
            }

            let cycle_start_instant = Instant::now();

            match self.run_once() {
                Ok(report) => {
                    if self.num_consec_errors > 0 {
                        info!("Cycle recovered after {} error(s)", self.num_consec_errors);
                    }
                    self.num_consec_errors = 0;

                    if report.traj_exhausted && cycles_this_run % 10 == 0 {
                        debug!("Holding final point of trajectory {:?}", report.traj_seq);
                    }
                }
                Err(e) => {
                    // Report the first of a run of errors, the repeats only at debug
                    if self.num_consec_errors == 0 {
                        warn!("Cycle error: {}", e);
                    } else {
                        debug!("Cycle error: {}", e);
                    }
                    self.num_consec_errors += 1;
                }
            }

            self.clock.advance(self.period.as_secs_f64());
            cycles_this_run += 1;

            // ---- CYCLE MANAGEMENT ----

            let cycle_dur = Instant::now() - cycle_start_instant;

            match self.period.checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => {
                    warn!(
                        "Cycle overran by {:.06} s",
                        cycle_dur.as_secs_f64() - self.period.as_secs_f64()
                    );
                    self.stats.num_overruns += 1;
                }
            }
        }

        info!(
            "Control loop stopped after {} cycles ({} published, {} overruns)",
            self.stats.num_cycles, self.stats.num_published, self.stats.num_overruns
        );
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        clock::MockClock,
        sim_ctrl::{Params, SimState},
        tm::SimTm,
    };
    use comms_if::msg::{
        chassis::{DrivingMode, GearPosition},
        planning::{AdcTrajectory, EStop, PathPoint, TrajectoryPoint},
        Header,
    };
    use std::f64::consts::FRAC_PI_4;

    const TOL: f64 = 1e-6;

    fn assert_near(a: f64, b: f64) {
        assert!((a - b).abs() < TOL, "{} is not near {}", a, b);
    }

    /// Publisher which keeps everything it is given, optionally failing a number of times first.
    #[derive(Default)]
    struct RecordingPublisher {
        published: Vec<SimTm>,
        fail_next: usize,
    }

    impl TmPublisher for RecordingPublisher {
        fn publish(&mut self, tm: &SimTm) -> Result<(), PublishError> {
            if self.fail_next > 0 {
                self.fail_next -= 1;
                return Err(PublishError::Send("link down".into()));
            }
            self.published.push(tm.clone());
            Ok(())
        }
    }

    /// Five points along a 45 degree line at a constant 10 m/s, 0.1 s apart, with arc lengths
    /// from the mean-speed recurrence used by the planning test fixtures.
    fn diagonal_traj(timestamp_s: f64) -> AdcTrajectory {
        let ts: [f64; 5] = [0.0, 0.1, 0.2, 0.3, 0.4];
        let mut vs: [f64; 5] = [10.0; 5];
        let mut ss: [f64; 5] = [0.0; 5];
        for i in 1..ts.len() {
            vs[i] = vs[i - 1];
            ss[i] = (vs[i - 1] + 0.5 * vs[i]) * ts[i];
        }

        let points = (0..5)
            .map(|i| TrajectoryPoint {
                path_point: PathPoint {
                    x: (ss[i] * ss[i] / 2.0).sqrt(),
                    y: (ss[i] * ss[i] / 2.0).sqrt(),
                    s: ss[i],
                    theta: FRAC_PI_4,
                    kappa: 0.0,
                },
                v: vs[i],
                a: 0.0,
                relative_time: ts[i],
            })
            .collect();

        AdcTrajectory {
            header: Header::new(timestamp_s, 1, "planning"),
            trajectory_point: points,
            ..Default::default()
        }
    }

    fn scheduler(clock: Arc<MockClock>, params: Params) -> SimScheduler<RecordingPublisher> {
        let mut sim_ctrl = SimCtrl::new(params);
        sim_ctrl.init(true).unwrap();

        SimScheduler::new(sim_ctrl, clock, RecordingPublisher::default())
    }

    #[test]
    fn test_end_to_end() {
        let clock = Arc::new(MockClock::new(100.0));
        let mut sched = scheduler(clock.clone(), Params::default());
        let handle = sched.handle();

        let traj = diagonal_traj(100.0);
        handle
            .set_start_point(traj.trajectory_point[0])
            .unwrap();
        assert_eq!(handle.on_trajectory(traj), Ok(true));

        clock.set_now(100.01);
        let report = sched.run_once().unwrap();
        assert_eq!(report.state, SimState::Running);
        assert!(!report.traj_exhausted);

        assert_eq!(sched.publisher().published.len(), 1);
        let tm = &sched.publisher().published[0];

        let chassis = &tm.chassis;
        assert!(chassis.engine_started);
        assert_eq!(chassis.driving_mode, DrivingMode::CompleteAutoDrive);
        assert_eq!(chassis.gear_location, GearPosition::GearDrive);
        assert_near(chassis.speed_mps, 10.0);
        assert_eq!(chassis.throttle_percentage, 0.0);
        assert_eq!(chassis.brake_percentage, 0.0);

        let pose = &tm.localization.pose;
        assert_near(pose.position.x, 0.10606601717803638);
        assert_near(pose.position.y, 0.10606601717803638);
        assert_near(pose.position.z, 0.0);
        assert_near(pose.heading, FRAC_PI_4);

        assert_near(pose.orientation.qw, (FRAC_PI_4 / 2.0).cos());
        assert_near(pose.orientation.qx, 0.0);
        assert_near(pose.orientation.qy, 0.0);
        assert_near(pose.orientation.qz, (FRAC_PI_4 / 2.0).sin());

        assert_near(pose.linear_velocity.x, 10.0 * FRAC_PI_4.cos());
        assert_near(pose.linear_velocity.y, 10.0 * FRAC_PI_4.sin());
        assert_near(pose.linear_velocity.z, 0.0);

        assert_near(pose.angular_velocity.x, 0.0);
        assert_near(pose.angular_velocity.y, 0.0);
        assert_near(pose.angular_velocity.z, 0.0);

        assert_near(pose.linear_acceleration.x, 0.0);
        assert_near(pose.linear_acceleration.y, 0.0);
        assert_near(pose.linear_acceleration.z, 0.0);

        assert_eq!(tm.chassis.header.timestamp_sec, 100.01);
        assert_eq!(tm.localization.header.timestamp_sec, 100.01);
    }

    #[test]
    fn test_holds_final_point() {
        let clock = Arc::new(MockClock::new(100.0));
        let mut sched = scheduler(clock.clone(), Params::default());
        let handle = sched.handle();

        let traj = diagonal_traj(100.0);
        let last = traj.trajectory_point[4];
        handle.on_trajectory(traj).unwrap();

        for t in &[100.4, 100.5, 101.0, 200.0] {
            clock.set_now(*t);
            let report = sched.run_once().unwrap();
            assert!(report.traj_exhausted);
        }

        let published = &sched.publisher().published;
        assert_eq!(published.len(), 4);

        let first = &published[0];
        assert_eq!(first.localization.pose.position.x, last.path_point.x);
        assert_eq!(first.localization.pose.position.y, last.path_point.y);
        assert_eq!(first.chassis.speed_mps, last.v);

        // Every later tick is identical apart from its header
        for tm in &published[1..] {
            assert_eq!(tm.localization.pose, first.localization.pose);
            assert_eq!(tm.chassis.engine_started, first.chassis.engine_started);
            assert_eq!(tm.chassis.driving_mode, first.chassis.driving_mode);
            assert_eq!(tm.chassis.gear_location, first.chassis.gear_location);
            assert_eq!(tm.chassis.speed_mps, first.chassis.speed_mps);
            assert_eq!(
                tm.chassis.throttle_percentage,
                first.chassis.throttle_percentage
            );
            assert_eq!(tm.chassis.brake_percentage, first.chassis.brake_percentage);
        }
    }

    #[test]
    fn test_disabled_publishes_nothing() {
        let clock = Arc::new(MockClock::new(0.0));
        let mut sim_ctrl = SimCtrl::new(Params::default());
        sim_ctrl.init(false).unwrap();
        let mut sched = SimScheduler::new(sim_ctrl, clock, RecordingPublisher::default());

        let report = sched.run_once().unwrap();
        assert_eq!(report.state, SimState::Disabled);
        assert!(sched.publisher().published.is_empty());

        // Disabling mid-run takes effect on the next cycle
        let handle = sched.handle();
        handle.set_enabled(true);
        handle
            .set_start_point(TrajectoryPoint::stationary(0.0, 0.0, 0.0))
            .unwrap();
        sched.run_once().unwrap();
        assert_eq!(sched.publisher().published.len(), 1);

        handle.set_enabled(false);
        sched.run_once().unwrap();
        assert_eq!(sched.publisher().published.len(), 1);
    }

    #[test]
    fn test_missing_seed_refuses_cycle() {
        let clock = Arc::new(MockClock::new(0.0));
        let mut sched = scheduler(clock, Params::default());

        match sched.run_once() {
            Err(SchedulerError::Sim(SimCtrlError::NoStartPoint)) => (),
            r => panic!("Expected NoStartPoint, got {:?}", r),
        }
        assert!(sched.publisher().published.is_empty());
        assert_eq!(sched.stats().num_sim_errors, 1);
    }

    #[test]
    fn test_estop_freezes() {
        let clock = Arc::new(MockClock::new(100.05));
        let mut sched = scheduler(clock.clone(), Params::default());
        let handle = sched.handle();

        let mut traj = diagonal_traj(100.0);
        traj.estop = EStop {
            is_estop: true,
            reason: "obstacle".into(),
        };
        handle.on_trajectory(traj).unwrap();

        let report = sched.run_once().unwrap();
        assert!(report.estop);

        let tm = &sched.publisher().published[0];
        assert_eq!(tm.chassis.speed_mps, 0.0);
        assert_eq!(tm.chassis.throttle_percentage, 0.0);
        assert_eq!(tm.chassis.brake_percentage, 0.0);
        assert_eq!(tm.localization.pose.linear_velocity.x, 0.0);
        assert_eq!(tm.localization.pose.linear_velocity.y, 0.0);

        // First e-stop tick with nothing published before takes the interpolated position
        assert_near(tm.localization.pose.position.x, 0.75 * FRAC_PI_4.cos());

        // Later ticks stay put however far the clock moves
        clock.set_now(100.35);
        sched.run_once().unwrap();

        let first = &sched.publisher().published[0];
        let later = &sched.publisher().published[1];
        assert_eq!(later.localization.pose.position, first.localization.pose.position);
        assert_eq!(later.localization.pose.linear_velocity.x, 0.0);
        assert_eq!(later.localization.pose.linear_velocity.y, 0.0);
        assert_eq!(later.chassis.speed_mps, 0.0);
    }

    #[test]
    fn test_estop_holds_last_published_position() {
        let clock = Arc::new(MockClock::new(100.2));
        let mut sched = scheduler(clock.clone(), Params::default());
        let handle = sched.handle();

        handle.on_trajectory(diagonal_traj(100.0)).unwrap();
        sched.run_once().unwrap();
        let moving = sched.publisher().published[0].localization.pose.position;
        assert!(sched.publisher().published[0].chassis.speed_mps > 0.0);

        let mut traj = diagonal_traj(100.0);
        traj.header.sequence_num = 2;
        traj.estop = EStop {
            is_estop: true,
            reason: "obstacle".into(),
        };
        handle.on_trajectory(traj).unwrap();

        for t in &[100.3, 100.4, 105.0] {
            clock.set_now(*t);
            let report = sched.run_once().unwrap();
            assert!(report.estop);
        }

        for tm in &sched.publisher().published[1..] {
            assert_eq!(tm.localization.pose.position, moving);
            assert_eq!(tm.chassis.speed_mps, 0.0);
        }
    }

    #[test]
    fn test_publish_failure_not_fatal() {
        let clock = Arc::new(MockClock::new(0.0));
        let mut sched = scheduler(clock, Params::default());
        sched
            .handle()
            .set_start_point(TrajectoryPoint::stationary(1.0, 1.0, 0.0))
            .unwrap();
        sched.publisher.fail_next = 1;

        match sched.run_once() {
            Err(SchedulerError::Publish(_)) => (),
            r => panic!("Expected a publish error, got {:?}", r),
        }
        assert!(sched.publisher().published.is_empty());

        sched.run_once().unwrap();
        assert_eq!(sched.publisher().published.len(), 1);

        let stats = sched.stats();
        assert_eq!(stats.num_cycles, 2);
        assert_eq!(stats.num_published, 1);
        assert_eq!(stats.num_publish_errors, 1);
    }

    #[test]
    fn test_reset_returns_to_seed() {
        let clock = Arc::new(MockClock::new(100.2));
        let mut sched = scheduler(clock, Params::default());
        let handle = sched.handle();

        handle
            .set_start_point(TrajectoryPoint::stationary(-3.0, 2.0, 0.0))
            .unwrap();
        handle.on_trajectory(diagonal_traj(100.0)).unwrap();
        sched.run_once().unwrap();

        handle.reset();
        let report = sched.run_once().unwrap();
        assert_eq!(report.state, SimState::AwaitingTrajectory);

        let tm = &sched.publisher().published[1];
        assert_eq!(tm.localization.pose.position.x, -3.0);
        assert_eq!(tm.chassis.driving_mode, DrivingMode::CompleteManual);
    }

    #[test]
    fn test_run_advances_mock_clock() {
        let clock = Arc::new(MockClock::new(10.0));
        let mut sched = scheduler(
            clock.clone(),
            Params {
                cycle_period_s: 0.01,
                start_point: Some(TrajectoryPoint::stationary(0.0, 0.0, 0.0)),
                ..Default::default()
            },
        );

        sched.run(Some(5));

        assert_eq!(sched.stats().num_cycles, 5);
        assert_eq!(sched.publisher().published.len(), 5);
        assert_near(clock.now_s(), 10.05);

        let times: Vec<f64> = sched
            .publisher()
            .published
            .iter()
            .map(|tm| tm.chassis.header.timestamp_sec)
            .collect();
        assert_near(times[0], 10.0);
        assert_near(times[4], 10.04);

        // A set stop flag prevents any further cycles
        let stop = AtomicBool::new(true);
        sched.run_until(&stop, None);
        assert_eq!(sched.stats().num_cycles, 5);

        sched.run_until(&AtomicBool::new(false), Some(2));
        assert_eq!(sched.stats().num_cycles, 7);
    }
}
