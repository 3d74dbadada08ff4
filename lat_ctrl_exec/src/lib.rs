//! # Lateral control library.
//!
//! This library allows the executable, tests and benchmarks to access the lateral controller and
//! its clients.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Trajectory store - recorded driver inputs indexed by time
pub mod traj_store;

/// Path cache - the latest planned path
pub mod path_cache;

/// Steering law - proportional, slew limited steering towards the path
pub mod steer_law;

/// Lateral control module - produces the driver inputs each cycle
pub mod lat_ctrl;

/// Path client - recieves planned paths from the planner
pub mod path_client;

/// Inputs server - publishes driver inputs to the vehicle
pub mod inputs_server;

/// Executable parameters
pub mod params;
