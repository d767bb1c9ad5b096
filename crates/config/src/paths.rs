//! Path utilities

use std::path::PathBuf;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_VAR: &str = "OPS_ASSISTANT_CONFIG";

/// Data directory (~/.ops-assistant)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".ops-assistant"))
        .unwrap_or_else(|| PathBuf::from(".ops-assistant"))
}

/// Config file location
pub fn config_path() -> PathBuf {
    crate::resolve_config_path(std::env::var(CONFIG_PATH_VAR).ok())
}
