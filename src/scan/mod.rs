//! Reading snapshots from disk

pub mod excludes;
pub mod snapshotter;

pub use excludes::{DefaultExcludes, DefaultExcludesList, DEFAULT_EXCLUDES};
pub use snapshotter::{DirectorySnapshotter, DirectoryWalkerPredicate, SnapshotResult, WalkStatistics};
