//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software: the messages exchanged with
//! the planning stack and telemetry consumers, the commands accepted by the sim, and the network
//! layer they travel over.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions (planning, routing, chassis, localization)
pub mod msg;

/// Commands accepted by the sim
pub mod tc;

/// Network module
pub mod net;
