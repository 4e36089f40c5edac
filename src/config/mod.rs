//! Configuration
//!
//! Layered with the `config` crate: built-in defaults, the global file
//! (`$XDG_CONFIG_HOME/snapvfs/config.toml`), the workspace file
//! (`<workspace>/.snapvfs/config.toml`) and `SNAPVFS__*` environment variables, in
//! increasing precedence.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use crate::path::CaseSensitivity;
use crate::scan::DefaultExcludesList;
use serde::{Deserialize, Serialize};

/// File watching settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Events for the same path within this window are merged
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Changes are applied to the VFS at most once per window
    #[serde(default = "default_batch_window_ms")]
    pub batch_window_ms: u64,

    /// A batch is flushed early once it holds this many paths
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_batch_window_ms() -> u64 {
    50
}

fn default_max_batch_size() -> usize {
    100
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            batch_window_ms: default_batch_window_ms(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

/// Top level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VfsConfig {
    /// Case sensitivity of the watched file system; the host convention when unset
    #[serde(default)]
    pub case_sensitivity: Option<CaseSensitivity>,

    /// Name patterns never included in directory snapshots
    #[serde(default)]
    pub default_excludes: DefaultExcludesList,

    #[serde(default)]
    pub watch: WatchSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VfsConfig {
    pub fn effective_case_sensitivity(&self) -> CaseSensitivity {
        self.case_sensitivity
            .unwrap_or_else(CaseSensitivity::for_current_os)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VfsConfig::default();
        assert_eq!(config.case_sensitivity, None);
        assert_eq!(config.effective_case_sensitivity(), CaseSensitivity::for_current_os());
        assert_eq!(config.watch.debounce_ms, 100);
        assert!(config.default_excludes.compile().exclude_dir(".git"));
    }

    #[test]
    fn test_deserialize_partial_toml_values() {
        let config: VfsConfig = serde_json::from_value(serde_json::json!({
            "case_sensitivity": "case-insensitive",
            "watch": { "debounce_ms": 10 }
        }))
        .unwrap();
        assert_eq!(config.effective_case_sensitivity(), CaseSensitivity::CaseInsensitive);
        assert_eq!(config.watch.debounce_ms, 10);
        assert_eq!(config.watch.batch_window_ms, 50);
    }
}
