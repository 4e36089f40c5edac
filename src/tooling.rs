//! Tooling layer
//!
//! Command-line access to snapshots, indices and watching.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
