//! Workspace configuration file

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};

pub const WORKSPACE_CONFIG_DIR: &str = ".snapvfs";

pub fn workspace_config_file(workspace_root: &Path) -> PathBuf {
    workspace_root.join(WORKSPACE_CONFIG_DIR).join("config.toml")
}

/// Add `<workspace>/.snapvfs/config.toml` when it exists
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = workspace_config_file(workspace_root);
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(false)))
}
