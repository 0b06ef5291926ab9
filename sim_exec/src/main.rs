//! Main sim control executable entry point.
//!
//! # Architecture
//!
//! The executable consists of:
//!
//!     - Initialisation of the session, logging and parameters
//!     - Initialisation of sim control
//!     - Network setup:
//!         - Planning client, a background thread delivering commands to sim control
//!         - TM server, publishing the telemetry of each cycle
//!     - Main loop, driven by the scheduler at the configured period
//!
//! Without the `net` feature telemetry is written to the log instead.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::info;
use std::sync::Arc;
use structopt::StructOpt;

// Internal
use sim_lib::{
    clock::{Clock, MockClock, WallClock},
    scheduler::SimScheduler,
    sim_ctrl::{self, SimCtrl},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

#[cfg(feature = "net")]
use comms_if::net::NetParams;
#[cfg(feature = "net")]
use sim_lib::{planning_client::PlanningClient, tm_server::TmServer};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "sim_exec", about = "Vehicle state emulator")]
struct Opts {
    /// Start disabled, nothing is published until an Enable command is recieved
    #[structopt(long)]
    passive: bool,

    /// Use a mocked clock starting at the given time (seconds) and advancing one period per cycle
    #[structopt(long)]
    mock_clock: Option<f64>,

    /// Stop after this many cycles
    #[structopt(long)]
    max_cycles: Option<u64>,

    /// Log at debug level
    #[structopt(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("sim_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = match opts.verbose {
        true => LevelFilter::Debug,
        false => LevelFilter::Info,
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    info!("Sim Control Executable\n");
    info!("Session directory: {:?}", session.session_root);
    info!("CLI options: {:?}\n", opts);

    // ---- LOAD PARAMETERS ----

    let params: sim_ctrl::Params =
        util::params::load("sim_ctrl.toml").wrap_err("Could not load sim_ctrl params")?;

    #[cfg(feature = "net")]
    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let enabled = params.enabled && !opts.passive;

    let mut sim_ctrl = SimCtrl::new(params);
    sim_ctrl
        .init(enabled)
        .wrap_err("Failed to initialise SimCtrl")?;
    info!("SimCtrl init complete");

    let clock: Arc<dyn Clock> = match opts.mock_clock {
        Some(start_s) => {
            match util::time::seconds_to_datetime(start_s) {
                Some(dt) => info!("Mock clock starts at {} ({:.3} s)", dt, start_s),
                None => return Err(eyre!("Invalid mock clock start time: {}", start_s)),
            }
            Arc::new(MockClock::new(start_s))
        }
        None => Arc::new(WallClock),
    };
    info!("Using {:?} clock", clock.mode());

    // ---- INITIALISE NETWORK ----

    #[cfg(feature = "net")]
    let (mut scheduler, _planning_client) = {
        info!("Initialising network");

        let zmq_ctx = comms_if::net::zmq::Context::new();

        let tm_server =
            TmServer::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise TmServer")?;
        info!("TmServer initialised");

        let scheduler = SimScheduler::new(sim_ctrl, clock, tm_server);

        let planning_client = PlanningClient::new(&zmq_ctx, &net_params, scheduler.handle())
            .wrap_err("Failed to initialise PlanningClient")?;
        info!("PlanningClient initialised");

        info!("Network initialisation complete");

        (scheduler, planning_client)
    };

    #[cfg(not(feature = "net"))]
    let mut scheduler = {
        info!("Network disabled, telemetry will be logged");
        SimScheduler::new(sim_ctrl, clock, sim_lib::tm::LogPublisher::new())
    };

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    scheduler.run(opts.max_cycles);

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}
