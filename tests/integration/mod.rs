//! Integration tests for snapvfs

mod cli_commands;
mod config_layers;
mod hierarchy_scenarios;
mod support;
mod vfs_on_disk;
