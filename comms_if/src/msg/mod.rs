//! # Messages
//!
//! All messages are sent as JSON strings.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod path;
pub mod vehicle;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use path::PathMsg;
pub use vehicle::VehicleInputs;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur when converting messages to or from JSON.
#[derive(Debug, thiserror::Error)]
pub enum MsgParseError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}
