//! # Path Message
//!
//! The planned path published by the path planner.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MsgParseError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A planned path in the vehicle frame.
///
/// The first point is the one the vehicle should be steering towards. X is forward, Y is to the
/// left.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PathMsg {
    /// Time at which the path was planned.
    pub stamp: DateTime<Utc>,

    /// Ordered points of the path, each as `[x, y]`.
    ///
    /// Units: meters,
    /// Frame: Vehicle body
    pub points_m: Vec<[f64; 2]>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PathMsg {
    /// Parse a path message from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, MsgParseError> {
        serde_json::from_str(json_str).map_err(MsgParseError::InvalidJson)
    }

    /// Serialise the message into a JSON string.
    pub fn to_json(&self) -> Result<String, MsgParseError> {
        serde_json::to_string(self).map_err(MsgParseError::InvalidJson)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_path_from_json() {
        let msg = PathMsg::from_json(
            r#"{"stamp": "2022-06-01T12:00:00Z", "points_m": [[2.0, 1.0], [3.0, 1.5]]}"#,
        )
        .unwrap();

        assert_eq!(msg.points_m, vec![[2.0, 1.0], [3.0, 1.5]]);

        // A point must have exactly two coordinates
        assert!(PathMsg::from_json(
            r#"{"stamp": "2022-06-01T12:00:00Z", "points_m": [[2.0, 1.0, 0.0]]}"#
        )
        .is_err());

        assert!(PathMsg::from_json("not json").is_err());
    }
}
