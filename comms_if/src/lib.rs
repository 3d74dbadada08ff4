//! # Communications interface crate.
//!
//! Provides the messages exchanged between the lateral controller and the
//! rest of the vehicle software, and the socket configuration used to carry
//! them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions (paths in, vehicle inputs out)
pub mod msg;

/// Network module
pub mod net;
