//! CLI Tooling
//!
//! Snapshots locations relative to a workspace and renders them as text tables or
//! JSON. Every command returns its output as a string; printing is up to the binary.

use crate::config::{ConfigLoader, VfsConfig};
use crate::error::VfsError;
use crate::snapshot::util::index_by_relative_path;
use crate::snapshot::{FileSystemLocationSnapshot, FileType};
use crate::tree::hierarchy::VfsStatistics;
use crate::types::{hash_to_hex, short_hex};
use crate::vfs::VirtualFileSystem;
use crate::watch::{VfsWatcher, WatchConfig};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde_json::json;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// snapvfs - snapshots of file system locations
#[derive(Parser)]
#[command(name = "snapvfs")]
#[command(about = "Content-hashed snapshots of files and directories")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory; relative paths are resolved against it
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (same as --log-level debug)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Snapshot a location and print its hash and counts
    Snapshot {
        path: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List every entry below a location with its type and hash
    Index {
        path: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Compare the contents of two locations
    Compare {
        left: PathBuf,
        right: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Watch the workspace and keep its snapshot current until interrupted
    Watch {
        /// Debounce window in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
        /// Batch window in milliseconds
        #[arg(long)]
        batch_window_ms: Option<u64>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Snapshot { .. } => "snapshot",
            Commands::Index { .. } => "index",
            Commands::Compare { .. } => "compare",
            Commands::Watch { .. } => "watch",
        }
    }
}

/// One differing entry between two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
struct Difference {
    change: &'static str,
    path: String,
}

/// CLI context: workspace, configuration and the VFS commands share
pub struct CliContext {
    workspace_root: PathBuf,
    config: VfsConfig,
    vfs: Arc<VirtualFileSystem>,
}

impl CliContext {
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, VfsError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: VfsConfig) -> Self {
        let vfs = Arc::new(VirtualFileSystem::from_config(&config));
        Self {
            workspace_root,
            config,
            vfs,
        }
    }

    pub fn config(&self) -> &VfsConfig {
        &self.config
    }

    pub fn vfs(&self) -> &Arc<VirtualFileSystem> {
        &self.vfs
    }

    pub fn execute(&self, command: &Commands) -> Result<String, VfsError> {
        info!(command = command.name(), workspace = ?self.workspace_root, "Executing command");
        match command {
            Commands::Snapshot { path, json } => self.handle_snapshot(path, *json),
            Commands::Index { path, json } => self.handle_index(path, *json),
            Commands::Compare { left, right, json } => self.handle_compare(left, right, *json),
            Commands::Watch {
                debounce_ms,
                batch_window_ms,
            } => self.handle_watch(*debounce_ms, *batch_window_ms),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    fn handle_snapshot(&self, path: &Path, as_json: bool) -> Result<String, VfsError> {
        let snapshot = self.vfs.snapshot_location(&self.resolve(path))?;
        let mut statistics = VfsStatistics::default();
        snapshot.accept(&mut statistics);

        if as_json {
            return to_json(&json!({
                "path": snapshot.absolute_path(),
                "type": file_type_name(snapshot.file_type()),
                "hash": hash_to_hex(&snapshot.hash()),
                "statistics": statistics,
            }));
        }
        Ok(format!(
            "Path: {}\nType: {}\nHash: {}\nFiles: {}  Directories: {}  Missing: {}",
            snapshot.absolute_path(),
            file_type_name(snapshot.file_type()),
            hash_to_hex(&snapshot.hash()),
            statistics.regular_files,
            statistics.directories,
            statistics.missing_files,
        ))
    }

    fn handle_index(&self, path: &Path, as_json: bool) -> Result<String, VfsError> {
        let snapshot = self.vfs.snapshot_location(&self.resolve(path))?;
        let index = index_by_relative_path(std::slice::from_ref(&snapshot));

        if as_json {
            let entries: serde_json::Map<String, serde_json::Value> = index
                .iter()
                .map(|(relative_path, entry)| {
                    (
                        relative_path.clone(),
                        json!({
                            "type": file_type_name(entry.file_type()),
                            "hash": hash_to_hex(&entry.hash()),
                        }),
                    )
                })
                .collect();
            return to_json(&serde_json::Value::Object(entries));
        }

        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["Path", "Type", "Hash"]);
        for (relative_path, entry) in &index {
            let hash = short_hex(&entry.hash(), 8);
            table.add_row(vec![
                relative_path.as_str(),
                file_type_name(entry.file_type()),
                hash.as_str(),
            ]);
        }
        Ok(table.to_string())
    }

    fn handle_compare(&self, left: &Path, right: &Path, as_json: bool) -> Result<String, VfsError> {
        let left = self.vfs.snapshot_location(&self.resolve(left))?;
        let right = self.vfs.snapshot_location(&self.resolve(right))?;
        let identical = left.is_content_up_to_date(&right);
        let differences = if identical {
            Vec::new()
        } else {
            differences(&left, &right)
        };

        if as_json {
            let rows: Vec<serde_json::Value> = differences
                .iter()
                .map(|d| json!({ "change": d.change, "path": d.path }))
                .collect();
            return to_json(&json!({
                "identical": identical,
                "left": hash_to_hex(&left.hash()),
                "right": hash_to_hex(&right.hash()),
                "differences": rows,
            }));
        }

        if identical {
            return Ok(format!(
                "Contents are identical ({})",
                short_hex(&left.hash(), 8)
            ));
        }
        let mut output = format!(
            "Contents differ ({} vs {})\n",
            short_hex(&left.hash(), 8),
            short_hex(&right.hash(), 8)
        );
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["Change", "Path"]);
        for difference in &differences {
            table.add_row(vec![difference.change, difference.path.as_str()]);
        }
        output.push_str(&table.to_string());
        Ok(output)
    }

    fn handle_watch(
        &self,
        debounce_ms: Option<u64>,
        batch_window_ms: Option<u64>,
    ) -> Result<String, VfsError> {
        let mut settings = self.config.watch.clone();
        if let Some(debounce_ms) = debounce_ms {
            settings.debounce_ms = debounce_ms;
        }
        if let Some(batch_window_ms) = batch_window_ms {
            settings.batch_window_ms = batch_window_ms;
        }

        let root = self.vfs.snapshot_location(&self.workspace_root)?;
        info!(root = root.absolute_path(), hash = %short_hex(&root.hash(), 8), "Initial snapshot");
        self.vfs.add_change_listener(Arc::new(
            |removed: &[FileSystemLocationSnapshot], added: &[FileSystemLocationSnapshot]| {
                info!(removed = removed.len(), added = added.len(), "VFS changed");
            },
        ));

        let config = WatchConfig::new(
            root.absolute_path(),
            &settings,
            self.config.default_excludes.compile(),
        );
        let watcher = VfsWatcher::new(Arc::clone(&self.vfs), config);
        watcher.start()?;
        Ok(format!("Stopped watching {}", root.absolute_path()))
    }
}

/// Entries added, removed or modified going from `left` to `right`, by relative path
fn differences(left: &FileSystemLocationSnapshot, right: &FileSystemLocationSnapshot) -> Vec<Difference> {
    let left_index = index_by_relative_path(std::slice::from_ref(left));
    let right_index = index_by_relative_path(std::slice::from_ref(right));
    let paths: BTreeSet<&String> = left_index.keys().chain(right_index.keys()).collect();

    paths
        .into_iter()
        .filter_map(|path| {
            let change = match (left_index.get(path), right_index.get(path)) {
                (Some(_), None) => "removed",
                (None, Some(_)) => "added",
                (Some(l), Some(r)) => {
                    let both_directories =
                        l.file_type() == FileType::Directory && r.file_type() == FileType::Directory;
                    if both_directories || l.is_content_up_to_date(r) {
                        return None;
                    }
                    "modified"
                }
                (None, None) => return None,
            };
            Some(Difference {
                change,
                path: path.clone(),
            })
        })
        .collect()
}

fn file_type_name(file_type: FileType) -> &'static str {
    match file_type {
        FileType::RegularFile => "file",
        FileType::Directory => "directory",
        FileType::Missing => "missing",
    }
}

fn to_json(value: &serde_json::Value) -> Result<String, VfsError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| VfsError::ConfigError(format!("Failed to render JSON: {}", e)))
}
