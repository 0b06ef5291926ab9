//! # TM Server
//!
//! Publishes the sim's telemetry over ZMQ. Each cycle is one multipart message:
//!
//! | Frame | Content                 |
//! |-------|-------------------------|
//! | 0     | `SIM_TM_TOPIC`          |
//! | 1     | chassis JSON            |
//! | 2     | localization JSON       |
//!
//! ZMQ delivers multipart messages atomically, so subscribers never see one record without the
//! other.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions, SIM_TM_TOPIC};

use crate::tm::{PublishError, SimTm, TmPublisher};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry server
pub struct TmServer {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send telemetry: {0}")]
    SendError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmServer {
    /// Create a new instance of the TM Server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, TmServerError> {
        Self::with_endpoint(ctx, &params.tm_endpoint)
    }

    /// Create a server bound to an explicit endpoint.
    pub fn with_endpoint(ctx: &zmq::Context, endpoint: &str) -> Result<Self, TmServerError> {
        let socket = MonitoredSocket::new(ctx, zmq::PUB, SocketOptions::publisher(), endpoint)
            .map_err(TmServerError::SocketError)?;

        Ok(Self { socket })
    }
}

impl TmPublisher for TmServer {
    fn publish(&mut self, tm: &SimTm) -> Result<(), PublishError> {
        let (chassis, localization) = tm.to_json()?;

        let frames: Vec<Vec<u8>> = vec![
            SIM_TM_TOPIC.as_bytes().to_vec(),
            chassis.into_bytes(),
            localization.into_bytes(),
        ];

        self.socket
            .send_multipart(frames, 0)
            .map_err(|e| PublishError::Send(Box::new(TmServerError::SendError(e))))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::msg::{chassis::Chassis, localization::LocalizationEstimate, Header};

    #[test]
    fn test_publish_multipart() {
        let ctx = zmq::Context::new();
        let endpoint = "inproc://test_tm_server";

        let mut server = TmServer::with_endpoint(&ctx, endpoint).unwrap();

        let subscriber = MonitoredSocket::new(
            &ctx,
            zmq::SUB,
            SocketOptions {
                recv_timeout: 100,
                ..SocketOptions::subscriber()
            },
            endpoint,
        )
        .unwrap();
        subscriber.set_subscribe(SIM_TM_TOPIC.as_bytes()).unwrap();

        let tm = SimTm {
            chassis: Chassis {
                header: Header::new(12.0, 3, "chassis"),
                speed_mps: 4.0,
                ..Default::default()
            },
            localization: LocalizationEstimate {
                header: Header::new(12.0, 3, "localization"),
                ..Default::default()
            },
        };

        // Slow joiner, keep publishing until the subscriber gets something
        let mut frames = None;
        for _ in 0..50 {
            server.publish(&tm).unwrap();
            if let Ok(f) = subscriber.recv_multipart(0) {
                frames = Some(f);
                break;
            }
        }

        let frames = frames.unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], SIM_TM_TOPIC.as_bytes());

        let chassis: Chassis = serde_json::from_slice(&frames[1]).unwrap();
        let localization: LocalizationEstimate = serde_json::from_slice(&frames[2]).unwrap();
        assert_eq!(chassis, tm.chassis);
        assert_eq!(localization, tm.localization);
    }
}
