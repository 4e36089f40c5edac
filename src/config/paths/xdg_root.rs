//! XDG base directory lookup

use crate::error::VfsError;
use std::path::PathBuf;

/// `$XDG_CONFIG_HOME`, or `$HOME/.config` when unset
pub fn config_home() -> Result<PathBuf, VfsError> {
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Ok(PathBuf::from(xdg_config_home));
        }
    }
    if let Some(base_dirs) = directories::BaseDirs::new() {
        return Ok(base_dirs.home_dir().join(".config"));
    }
    Err(VfsError::ConfigError(
        "Could not determine XDG config home directory (HOME not set)".to_string(),
    ))
}

/// `$XDG_CONFIG_HOME/snapvfs/config.toml`
pub fn global_config_file() -> Result<PathBuf, VfsError> {
    Ok(config_home()?.join("snapvfs").join("config.toml"))
}
