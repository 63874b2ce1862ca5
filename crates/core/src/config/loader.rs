//! Config path resolution
//!
//! Resolves the finhook base directory from `FINHOOK_HOME`, falling back to
//! the location of the host executable.

use std::path::PathBuf;

use super::{ConfigError, ConfigResult};

/// Environment variable overriding the base directory
pub const HOME_ENV: &str = "FINHOOK_HOME";

/// Returns the finhook base directory.
///
/// Uses `$FINHOOK_HOME` when set. Otherwise the host binary is expected at
/// `<base>/bin/<host>`, so this navigates up 2 levels from the executable.
pub fn finhook_base_dir() -> ConfigResult<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }

    let exe = std::env::current_exe().map_err(ConfigError::IoError)?;

    // Navigate: host -> bin -> base
    exe.parent() // bin/
        .and_then(|p| p.parent()) // base/
        .map(PathBuf::from)
        .ok_or(ConfigError::NoConfigDirectory)
}

/// Returns the base configs directory.
///
/// Path: `<base>/configs/`
pub fn configs_dir() -> ConfigResult<PathBuf> {
    Ok(finhook_base_dir()?.join("configs"))
}

/// Returns the core config path.
///
/// Path: `<base>/configs/core.toml`
pub fn core_config_path() -> ConfigResult<PathBuf> {
    Ok(configs_dir()?.join("core.toml"))
}
