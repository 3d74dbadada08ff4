//! # Vehicle Messages
//!
//! Demands sent to the vehicle's actuators.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MsgParseError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Normalised driver inputs for the vehicle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct VehicleInputs {
    /// Time at which the inputs were produced.
    pub stamp: DateTime<Utc>,

    /// Steering demand, -1 (full right) to +1 (full left).
    pub steering: f64,

    /// Throttle demand, 0 to 1.
    pub throttle: f64,

    /// Braking demand, 0 to 1.
    pub braking: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VehicleInputs {
    /// Parse vehicle inputs from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, MsgParseError> {
        serde_json::from_str(json_str).map_err(MsgParseError::InvalidJson)
    }

    /// Serialise the inputs into a JSON string.
    pub fn to_json(&self) -> Result<String, MsgParseError> {
        serde_json::to_string(self).map_err(MsgParseError::InvalidJson)
    }
}
