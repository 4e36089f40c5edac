//! ConfigLoader facade delegating to the merge service.

use super::merge::service::MergeService;
use super::VfsConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global and workspace files plus the environment.
    pub fn load(workspace_root: &Path) -> Result<VfsConfig, ConfigError> {
        MergeService::load(workspace_root)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<VfsConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    pub fn default() -> VfsConfig {
        VfsConfig::default()
    }
}
