//! Change notifications for hierarchy updates

use crate::snapshot::FileSystemLocationSnapshot;
use crate::tree::node::FileSystemNode;

/// Receives the nodes a store or invalidation adds to or removes from a hierarchy
pub trait NodeDiffListener {
    fn node_removed(&mut self, node: &FileSystemNode);
    fn node_added(&mut self, node: &FileSystemNode);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiffListener;

impl NodeDiffListener for NoopDiffListener {
    fn node_removed(&mut self, _node: &FileSystemNode) {}
    fn node_added(&mut self, _node: &FileSystemNode) {}
}

/// Receives the complete snapshots that left and entered a hierarchy in one update
pub trait SnapshotDiffListener: Send + Sync {
    fn changed(&self, removed: &[FileSystemLocationSnapshot], added: &[FileSystemLocationSnapshot]);
}

impl<F> SnapshotDiffListener for F
where
    F: Fn(&[FileSystemLocationSnapshot], &[FileSystemLocationSnapshot]) + Send + Sync,
{
    fn changed(&self, removed: &[FileSystemLocationSnapshot], added: &[FileSystemLocationSnapshot]) {
        self(removed, added)
    }
}

/// Collects the root snapshots of added and removed nodes
#[derive(Debug, Default, Clone)]
pub struct SnapshotCollectingDiffListener {
    removed: Vec<FileSystemLocationSnapshot>,
    added: Vec<FileSystemLocationSnapshot>,
}

impl SnapshotCollectingDiffListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn removed_snapshots(&self) -> &[FileSystemLocationSnapshot] {
        &self.removed
    }

    pub fn added_snapshots(&self) -> &[FileSystemLocationSnapshot] {
        &self.added
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Hand the collected diff to `listener`; nothing is published for an empty diff
    pub fn publish_snapshot_diff(&self, listener: &dyn SnapshotDiffListener) {
        if !self.is_empty() {
            listener.changed(&self.removed, &self.added);
        }
    }
}

impl NodeDiffListener for SnapshotCollectingDiffListener {
    fn node_removed(&mut self, node: &FileSystemNode) {
        node.visit_root_snapshots(&mut |snapshot| self.removed.push(snapshot.clone()));
    }

    fn node_added(&mut self, node: &FileSystemNode) {
        node.visit_root_snapshots(&mut |snapshot| self.added.push(snapshot.clone()));
    }
}
