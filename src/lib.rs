//! snapvfs: immutable virtual file system snapshots
//!
//! Knowledge about the file system is kept in a persistent, path-compressed trie of
//! file and directory snapshots. Updates return a new tree sharing every untouched
//! node with the old one, so readers never block writers.

pub mod config;
pub mod error;
pub mod logging;
pub mod path;
pub mod scan;
pub mod snapshot;
pub mod tooling;
pub mod tree;
pub mod types;
pub mod vfs;
pub mod watch;

pub use config::{ConfigLoader, VfsConfig};
pub use error::VfsError;
pub use path::{CaseSensitivity, VfsRelativePath};
pub use snapshot::{
    AccessType, DirectorySnapshot, FileMetadata, FileSystemLocationSnapshot, FileType,
    MetadataSnapshot, MissingFileSnapshot, RegularFileSnapshot,
};
pub use tree::{FileSystemNode, SnapshotHierarchy, VfsStatistics};
pub use types::Hash;
pub use vfs::VirtualFileSystem;
