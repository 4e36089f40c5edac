//! Snapshot hierarchy: a persistent trie of file system knowledge
//!
//! Paths are stored relative to their parent node and compressed where a node has a
//! single known child. Every update produces a new tree that shares all untouched
//! nodes with the previous one.

pub mod child_map;
pub mod diff;
pub mod hasher;
pub mod hierarchy;
pub mod node;

pub use child_map::{ChildMap, Entry, NodeRelation};
pub use diff::{NodeDiffListener, NoopDiffListener, SnapshotCollectingDiffListener, SnapshotDiffListener};
pub use hasher::{DefaultFileHasher, FileHasher};
pub use hierarchy::{SnapshotHierarchy, VfsStatistics};
pub use node::FileSystemNode;
