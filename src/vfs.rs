//! Virtual file system
//!
//! Holds the current `SnapshotHierarchy`. Readers clone the root out of a read lock
//! and work on that version without further locking. Writers are serialized, build
//! the next version from the current one and install it, then publish the snapshots
//! that left and entered the hierarchy to the registered change listeners.
//!
//! Snapshots read from disk are only stored if no invalidation ran while they
//! were being taken.

use crate::config::VfsConfig;
use crate::error::VfsError;
use crate::path::CaseSensitivity;
use crate::scan::snapshotter::{absolute_path, path_to_string};
use crate::scan::{DirectorySnapshotter, DirectoryWalkerPredicate, SnapshotResult};
use crate::snapshot::{FileSystemLocationSnapshot, MetadataSnapshot};
use crate::tree::diff::{NodeDiffListener, SnapshotCollectingDiffListener, SnapshotDiffListener};
use crate::tree::hasher::DefaultFileHasher;
use crate::tree::hierarchy::{SnapshotHierarchy, VfsStatistics};
use parking_lot::{Mutex, RwLock};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

pub struct VirtualFileSystem {
    root: RwLock<SnapshotHierarchy>,
    update_lock: Mutex<()>,
    /// Bumped under `update_lock` by every invalidation
    invalidations: AtomicU64,
    snapshotter: DirectorySnapshotter,
    listeners: RwLock<Vec<Arc<dyn SnapshotDiffListener>>>,
}

impl VirtualFileSystem {
    pub fn new(case_sensitivity: CaseSensitivity, snapshotter: DirectorySnapshotter) -> Self {
        Self {
            root: RwLock::new(SnapshotHierarchy::empty(case_sensitivity)),
            update_lock: Mutex::new(()),
            invalidations: AtomicU64::new(0),
            snapshotter,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// A VFS hashing with blake3 and excluding what the configuration names
    pub fn from_config(config: &VfsConfig) -> Self {
        let snapshotter = DirectorySnapshotter::new(
            Arc::new(DefaultFileHasher),
            config.default_excludes.compile(),
        );
        Self::new(config.effective_case_sensitivity(), snapshotter)
    }

    /// The current version of the hierarchy
    pub fn root(&self) -> SnapshotHierarchy {
        self.root.read().clone()
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.root.read().case_sensitivity()
    }

    pub fn find_snapshot(&self, absolute_path: &str) -> Option<FileSystemLocationSnapshot> {
        self.root().find_snapshot(absolute_path)
    }

    pub fn find_metadata(&self, absolute_path: &str) -> Option<MetadataSnapshot> {
        self.root().find_metadata(absolute_path)
    }

    pub fn statistics(&self) -> VfsStatistics {
        self.root().statistics()
    }

    pub fn add_change_listener(&self, listener: Arc<dyn SnapshotDiffListener>) {
        self.listeners.write().push(listener);
    }

    /// Store a complete snapshot at its own absolute path
    pub fn store(&self, snapshot: FileSystemLocationSnapshot) {
        let absolute_path = snapshot.absolute_path().to_string();
        self.store_metadata(&absolute_path, MetadataSnapshot::Location(snapshot));
    }

    pub fn store_metadata(&self, absolute_path: &str, snapshot: MetadataSnapshot) {
        debug!(path = absolute_path, file_type = ?snapshot.file_type(), "Storing in VFS");
        self.update(|root, listener| root.store(absolute_path, &snapshot, listener));
    }

    /// Drop everything known at and below each of `paths`
    pub fn invalidate<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.update(|root, listener| {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
            paths.into_iter().fold(root.clone(), |current, path| {
                debug!(path = path.as_ref(), "Invalidating VFS path");
                current.invalidate(path.as_ref(), &mut *listener)
            })
        });
    }

    pub fn invalidate_all(&self) {
        debug!("Invalidating the whole VFS");
        self.update(|root, listener| {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
            if let Some(node) = root.root_node() {
                listener.node_removed(node);
            }
            root.cleared()
        });
    }

    /// The snapshot at `path`, from the hierarchy when known, otherwise read from
    /// disk and stored. A snapshot raced by an invalidation is returned uncached.
    pub fn snapshot_location(&self, path: &Path) -> Result<FileSystemLocationSnapshot, VfsError> {
        let absolute = path_to_string(&absolute_path(path)?)?;
        if let Some(snapshot) = self.find_snapshot(&absolute) {
            debug!(path = %absolute, "VFS hit");
            return Ok(snapshot);
        }
        debug!(path = %absolute, "VFS miss, snapshotting");
        let generation = self.invalidations.load(Ordering::SeqCst);
        let snapshot = self.snapshotter.snapshot_location(path)?;
        self.store_unless_invalidated(&snapshot, generation);
        Ok(snapshot)
    }

    /// Snapshot the directory at `path` through `predicate`.
    ///
    /// Only results the predicate left untouched are stored, since a filtered
    /// snapshot does not describe the whole directory.
    pub fn snapshot_directory_filtered(
        &self,
        path: &Path,
        predicate: &dyn DirectoryWalkerPredicate,
    ) -> Result<SnapshotResult, VfsError> {
        let generation = self.invalidations.load(Ordering::SeqCst);
        let result = self.snapshotter.snapshot_directory(path, Some(predicate))?;
        if !result.filtered {
            self.store_unless_invalidated(&result.snapshot, generation);
        }
        Ok(result)
    }

    /// Store `snapshot` if no invalidation happened since `generation` was read
    fn store_unless_invalidated(&self, snapshot: &FileSystemLocationSnapshot, generation: u64) -> bool {
        let absolute_path = snapshot.absolute_path();
        let metadata = MetadataSnapshot::Location(snapshot.clone());
        let mut stored = false;
        self.update(|root, listener| {
            if self.invalidations.load(Ordering::SeqCst) != generation {
                return root.clone();
            }
            stored = true;
            root.store(absolute_path, &metadata, listener)
        });
        if !stored {
            debug!(path = absolute_path, "Invalidated while snapshotting, not storing");
        }
        stored
    }

    fn update<F>(&self, updater: F)
    where
        F: FnOnce(&SnapshotHierarchy, &mut SnapshotCollectingDiffListener) -> SnapshotHierarchy,
    {
        let mut diff = SnapshotCollectingDiffListener::new();
        {
            let _guard = self.update_lock.lock();
            let current = self.root();
            let next = updater(&current, &mut diff);
            *self.root.write() = next;
        }
        if diff.is_empty() {
            return;
        }
        debug!(
            removed = diff.removed_snapshots().len(),
            added = diff.added_snapshots().len(),
            "Replaced VFS root"
        );
        let listeners = self.listeners.read().clone();
        for listener in &listeners {
            diff.publish_snapshot_diff(listener.as_ref());
        }
    }
}
