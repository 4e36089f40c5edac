//! Environment variable source: SNAPVFS_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub(crate) fn source() -> Environment {
    Environment::with_prefix("SNAPVFS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("default_excludes")
}

/// Add the environment overlay, e.g. `SNAPVFS__WATCH__DEBOUNCE_MS=20`
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(source()))
}
