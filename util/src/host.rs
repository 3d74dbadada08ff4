//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the software root.
pub const SW_ROOT_ENV_VAR: &str = "LAT_CTRL_SW_ROOT";

/// Get the root directory of the software, as set by the `LAT_CTRL_SW_ROOT`
/// environment variable.
///
/// The `params` and `sessions` directories are found under this root.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
