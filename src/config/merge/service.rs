//! MergeService: stacks the sources and deserializes the result into VfsConfig.

use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::VfsConfig;
use config::{ConfigError, File, FileFormat};
use std::path::Path;

use super::merge_policy;

pub struct MergeService;

impl MergeService {
    /// Precedence: defaults -> global file -> workspace file -> environment (highest).
    pub fn load(workspace_root: &Path) -> Result<VfsConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }

    /// A single required TOML file with the environment overlay.
    pub fn load_from_file(path: &Path) -> Result<VfsConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).format(FileFormat::Toml).required(true));
        let builder = environment::add_to_builder(builder)?;

        builder.build()?.try_deserialize()
    }
}
