//! Path resolution for config and session files.

use std::path::PathBuf;

use crate::config::{default_config_path, default_session_path, read_config, NotevaultConfig};
use crate::constants::CONFIG_ENV;

/// Resolve the config file path, checking NOTEVAULT_CONFIG first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Read the config file, or fall back to defaults when there is none.
pub fn load_config() -> anyhow::Result<NotevaultConfig> {
    let path = resolve_config_path()?;
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return Ok(NotevaultConfig::default());
    }
    read_config(&path)
}

/// Where the saved session lives.
pub fn resolve_session_path() -> anyhow::Result<PathBuf> {
    default_session_path()
}
