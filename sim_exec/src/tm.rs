//! # Telemetry
//!
//! The pair of records produced by each control cycle, and the seam through which they leave the
//! sim.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, trace};
use serde::{Deserialize, Serialize};

use comms_if::msg::{chassis::Chassis, localization::LocalizationEstimate};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A sink for telemetry.
///
/// Implementors must send both records of a `SimTm` together: either both are published or
/// neither is.
pub trait TmPublisher {
    fn publish(&mut self, tm: &SimTm) -> Result<(), PublishError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry produced by one control cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimTm {
    pub chassis: Chassis,
    pub localization: LocalizationEstimate,
}

/// Publisher which writes telemetry to the log, used when the network stack is not available.
#[derive(Debug, Default)]
pub struct LogPublisher {
    num_published: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Could not serialize the telemetry: {0}")]
    Serialization(serde_json::Error),

    #[error("Could not send the telemetry: {0}")]
    Send(Box<dyn std::error::Error + Send + Sync>),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimTm {
    /// Serialize both records to JSON, chassis first.
    pub fn to_json(&self) -> Result<(String, String), PublishError> {
        Ok((
            serde_json::to_string(&self.chassis).map_err(PublishError::Serialization)?,
            serde_json::to_string(&self.localization).map_err(PublishError::Serialization)?,
        ))
    }
}

impl LogPublisher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TmPublisher for LogPublisher {
    fn publish(&mut self, tm: &SimTm) -> Result<(), PublishError> {
        let (chassis, localization) = tm.to_json()?;

        // Print every 10th packet at info, the rest at trace
        if self.num_published % 10 == 0 {
            info!("TM chassis: {}", chassis);
            info!("TM localization: {}", localization);
        } else {
            trace!("TM chassis: {}", chassis);
            trace!("TM localization: {}", localization);
        }

        self.num_published += 1;

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
