//! Indices over snapshot hierarchies

use super::visitor::{accept_all, RelativePathTrackingVisitor, SnapshotVisitResult};
use super::{FileSystemLocationSnapshot, FileType};
use crate::path::RelativePathTracker;
use crate::types::Hash;
use std::collections::BTreeMap;

/// Every location of the given roots, keyed by absolute path
pub fn index_by_absolute_path(
    roots: &[FileSystemLocationSnapshot],
) -> BTreeMap<String, FileSystemLocationSnapshot> {
    let mut index = BTreeMap::new();
    accept_all(roots, &mut |snapshot: &FileSystemLocationSnapshot| {
        index.insert(snapshot.absolute_path().to_string(), snapshot.clone());
        SnapshotVisitResult::Continue
    });
    index
}

struct RelativeIndexer<'a> {
    index: &'a mut BTreeMap<String, FileSystemLocationSnapshot>,
}

impl RelativePathTrackingVisitor for RelativeIndexer<'_> {
    fn visit_entry(
        &mut self,
        snapshot: &FileSystemLocationSnapshot,
        tracker: &RelativePathTracker,
    ) -> SnapshotVisitResult {
        if !tracker.is_root() {
            self.index.insert(tracker.to_relative_path(), snapshot.clone());
        } else if snapshot.file_type() != FileType::Directory {
            self.index.insert(snapshot.name().to_string(), snapshot.clone());
        }
        SnapshotVisitResult::Continue
    }
}

/// Every location below the given roots, keyed by its path relative to its root.
///
/// Root directories are not part of the index; a root that is not a directory is
/// indexed by its name.
pub fn index_by_relative_path(
    roots: &[FileSystemLocationSnapshot],
) -> BTreeMap<String, FileSystemLocationSnapshot> {
    let mut index = BTreeMap::new();
    let mut indexer = RelativeIndexer { index: &mut index };
    for root in roots {
        root.accept_tracking(&mut RelativePathTracker::new(), &mut indexer);
    }
    index
}

/// Hash of every root, keyed by absolute path
pub fn root_hashes(roots: &[FileSystemLocationSnapshot]) -> BTreeMap<String, Hash> {
    let mut hashes = BTreeMap::new();
    accept_all(roots, &mut |snapshot: &FileSystemLocationSnapshot| {
        hashes.insert(snapshot.absolute_path().to_string(), snapshot.hash());
        SnapshotVisitResult::SkipSubtree
    });
    hashes
}
