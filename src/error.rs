//! Error types
//!
//! The tree algorithms are infallible: absence is `None`, broken invariants panic.
//! Everything touching the disk, the OS watcher or configuration reports `VfsError`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VfsError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not list contents of directory '{}': {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),

    #[error("Cannot snapshot {0}: not a regular file")]
    UnsupportedFileType(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("File watching error: {0}")]
    Watch(#[from] notify::Error),
}

impl VfsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VfsError::Io {
            path: path.into(),
            source,
        }
    }
}
