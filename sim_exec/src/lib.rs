//! # Sim Control library.
//!
//! Emulates a vehicle following planned trajectories, producing the chassis and localization
//! telemetry a real vehicle would. This library allows the executable, the benchmarks and other
//! crates in the workspace to access the items defined inside the sim crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Clock - wall and mocked time sources
pub mod clock;

/// Pose interpolation - finds the point on a trajectory at a given time
pub mod interp;

/// Kinematics - converts a trajectory point into position, velocity and acceleration vectors
pub mod kinematics;

/// Planning client - recieves trajectories and commands from the planning stack
#[cfg(feature = "net")]
pub mod planning_client;

/// Control loop scheduler - runs sim control at a fixed rate
pub mod scheduler;

/// Sim control module - the vehicle state machine
pub mod sim_ctrl;

/// Start point manager - the pose used before any trajectory has arrived
pub mod start_point;

/// Telemetry - the records produced each cycle and the publisher interface
pub mod tm;

/// Telemetry server - publishes telemetry over the network
#[cfg(feature = "net")]
pub mod tm_server;

/// Trajectory store - thread safe holder of the active trajectory
pub mod traj_store;

/// Vehicle emulator - derives the chassis status
pub mod vehicle;
