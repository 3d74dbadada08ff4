//! # Lateral control module
//!
//! Lateral control turns the latest planned path into driver inputs for the
//! vehicle, once per control cycle. It runs in one of two modes, fixed at
//! initialisation:
//!
//! - `LivePath`: steering is proportional to the y/x ratio of the first path
//!   point (see [`crate::steer_law`]), throttle is a constant demand and
//!   braking is left alone. Nothing is output until the first path arrives.
//! - `Playback`: all three inputs are replayed from a recording (see
//!   [`crate::traj_store`]), timed from initialisation.
//!
//! Every output is saturated to its valid range before it leaves the module,
//! and any cycle which can't produce a valid demand holds the previous one.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::traj_store::TrajStoreError;

pub use params::Params;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Source of the driver inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Steer towards the latest planned path
    LivePath,

    /// Replay recorded inputs
    Playback,
}

/// Errors which can occur while initialising LatCtrl.
#[derive(Debug, thiserror::Error)]
pub enum LatCtrlError {
    #[error("Invalid lateral control configuration: {0}")]
    ConfigError(String),

    #[error("Malformed trajectory file: {0}")]
    MalformedTrajectoryFile(#[from] TrajStoreError),
}
