//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Environment variable which points at the root of the software tree, under which the `params`
/// and `sessions` directories live.
pub const SW_ROOT_ENV_VAR: &str = "SIM_CTRL_ROOT";

/// Get the root directory of the software tree from the environment.
pub fn get_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
