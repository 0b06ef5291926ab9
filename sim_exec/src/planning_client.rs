//! # Planning Client
//!
//! Receives telecommands from the planning side of the stack and delivers them to sim control.
//!
//! The client owns a background thread which polls a SUB socket and calls the matching
//! [`SimCtrlHandle`] method for each command. Messages are handled in arrival order. Dropping the
//! client stops the thread.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use comms_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    tc::{Tc, TcParseError},
};

use crate::{
    sim_ctrl::{SimCtrlError, SimCtrlHandle},
    traj_store::TrajectoryError,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Planning client
pub struct PlanningClient {
    shutdown: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PlanningClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not subscribe to commands: {0}")]
    SubscribeError(zmq::Error),

    #[error("Could not recieve a message: {0}")]
    RecvError(zmq::Error),

    #[error("The server sent a message which was not valid UTF-8")]
    NonUtf8Message,

    #[error("Could not parse the recieved telecommand: {0}")]
    TcParseError(TcParseError),

    #[error("Trajectory rejected: {0}")]
    Trajectory(TrajectoryError),

    #[error("Sim control rejected the command: {0}")]
    SimCtrl(SimCtrlError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlanningClient {
    /// Create a new client and start its receive thread.
    ///
    /// This function will not block until the server connects.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        handle: SimCtrlHandle,
    ) -> Result<Self, PlanningClientError> {
        Self::with_endpoint(ctx, &params.cmd_endpoint, handle)
    }

    /// Create a client connected to an explicit endpoint.
    pub fn with_endpoint(
        ctx: &zmq::Context,
        endpoint: &str,
        handle: SimCtrlHandle,
    ) -> Result<Self, PlanningClientError> {
        let socket = MonitoredSocket::new(ctx, zmq::SUB, SocketOptions::subscriber(), endpoint)
            .map_err(PlanningClientError::SocketError)?;
        socket
            .set_subscribe(b"")
            .map_err(PlanningClientError::SubscribeError)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = thread::spawn(move || recv_loop(socket, handle, shutdown_clone));

        info!("Planning client listening on {}", endpoint);

        Ok(Self {
            shutdown,
            join_handle: Some(join_handle),
        })
    }
}

impl Drop for PlanningClient {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        if let Some(jh) = self.join_handle.take() {
            jh.join().ok();
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a JSON telecommand and deliver it to sim control.
pub fn handle_tc_str(handle: &SimCtrlHandle, tc_str: &str) -> Result<(), PlanningClientError> {
    let tc = Tc::from_json(tc_str).map_err(PlanningClientError::TcParseError)?;

    dispatch(handle, tc)
}

/// Deliver a telecommand to sim control.
pub fn dispatch(handle: &SimCtrlHandle, tc: Tc) -> Result<(), PlanningClientError> {
    debug!("Recieved {} TC", tc.name());

    match tc {
        Tc::Planning(traj) => handle
            .on_trajectory(traj)
            .map(|_| ())
            .map_err(PlanningClientError::Trajectory),
        Tc::Routing(routing) => handle
            .on_routing(routing)
            .map_err(PlanningClientError::SimCtrl),
        Tc::SetStartPoint(point) => handle
            .set_start_point(point)
            .map(|_| ())
            .map_err(PlanningClientError::SimCtrl),
        Tc::Reset => {
            handle.reset();
            Ok(())
        }
        Tc::Enable => {
            handle.set_enabled(true);
            Ok(())
        }
        Tc::Disable => {
            handle.set_enabled(false);
            Ok(())
        }
    }
}

/// Receive thread body.
fn recv_loop(socket: MonitoredSocket, handle: SimCtrlHandle, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::Relaxed) {
        let result = match socket.recv_string(0) {
            Ok(Ok(s)) => handle_tc_str(&handle, &s),
            Ok(Err(_)) => Err(PlanningClientError::NonUtf8Message),
            // Timeout, check for shutdown
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => Err(PlanningClientError::RecvError(e)),
        };

        if let Err(e) = result {
            warn!("Planning client error: {}", e);
        }
    }

    debug!("Planning client thread stopped");
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
