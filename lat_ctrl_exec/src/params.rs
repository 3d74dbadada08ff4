//! # Lateral control executable parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct LatCtrlExecParams {
    /// Endpoint that planned paths are published on
    pub path_endpoint: String,

    /// Endpoint to publish vehicle inputs on
    pub vehicle_inputs_endpoint: String,

    /// Name of the lateral control parameter file, within the params directory
    #[serde(default = "default_lat_ctrl_params")]
    pub lat_ctrl_params: String,
}

fn default_lat_ctrl_params() -> String {
    String::from("lat_ctrl.toml")
}
