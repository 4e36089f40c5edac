//! Built-in defaults beneath every other source

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// A builder seeded with the scalar defaults; lists and maps fall back to serde
/// defaults during deserialization.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("watch.debounce_ms", 100)?
        .set_default("watch.batch_window_ms", 50)?
        .set_default("watch.max_batch_size", 100)?
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
