//! Root of the snapshot hierarchy
//!
//! `SnapshotHierarchy` is a persistent value: `store` and `invalidate` return a new
//! hierarchy and leave the receiver untouched, so readers can keep using an old
//! version while a writer installs a new one.

use crate::path::{CaseSensitivity, VfsRelativePath};
use crate::snapshot::visitor::{FileSystemSnapshotHierarchyVisitor, SnapshotVisitResult};
use crate::snapshot::{FileSystemLocationSnapshot, FileType, MetadataSnapshot};
use crate::tree::diff::NodeDiffListener;
use crate::tree::node::FileSystemNode;
use serde::Serialize;

/// Number of snapshots retained by a hierarchy, directory contents included
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VfsStatistics {
    pub regular_files: usize,
    pub directories: usize,
    pub missing_files: usize,
}

impl VfsStatistics {
    pub fn total(&self) -> usize {
        self.regular_files + self.directories + self.missing_files
    }
}

impl FileSystemSnapshotHierarchyVisitor for VfsStatistics {
    fn visit_entry(&mut self, snapshot: &FileSystemLocationSnapshot) -> SnapshotVisitResult {
        match snapshot.file_type() {
            FileType::RegularFile => self.regular_files += 1,
            FileType::Directory => self.directories += 1,
            FileType::Missing => self.missing_files += 1,
        }
        SnapshotVisitResult::Continue
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHierarchy {
    root: Option<FileSystemNode>,
    case_sensitivity: CaseSensitivity,
}

impl SnapshotHierarchy {
    pub fn empty(case_sensitivity: CaseSensitivity) -> Self {
        Self {
            root: None,
            case_sensitivity,
        }
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case_sensitivity
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Node for the file system root
    pub fn root_node(&self) -> Option<&FileSystemNode> {
        self.root.as_ref()
    }

    /// Empty hierarchy with the same case sensitivity
    pub fn cleared(&self) -> Self {
        Self::empty(self.case_sensitivity)
    }

    pub fn find_metadata(&self, absolute_path: &str) -> Option<MetadataSnapshot> {
        self.root
            .as_ref()?
            .get_snapshot(VfsRelativePath::of(absolute_path), self.case_sensitivity)
    }

    /// Complete snapshot of `absolute_path`; `None` when only partial or no
    /// information is available
    pub fn find_snapshot(&self, absolute_path: &str) -> Option<FileSystemLocationSnapshot> {
        self.find_metadata(absolute_path)?.into_location()
    }

    pub fn get_node(&self, absolute_path: &str) -> Option<FileSystemNode> {
        self.root
            .as_ref()?
            .get_node(VfsRelativePath::of(absolute_path), self.case_sensitivity)
    }

    /// Whether any complete snapshot is known at or below `absolute_path`
    pub fn has_descendants_under(&self, absolute_path: &str) -> bool {
        self.get_node(absolute_path)
            .map(|node| node.has_descendants())
            .unwrap_or(false)
    }

    /// Topmost complete snapshots at or below `absolute_path`
    pub fn root_snapshots_under(&self, absolute_path: &str) -> Vec<FileSystemLocationSnapshot> {
        self.get_node(absolute_path)
            .map(|node| node.root_snapshots())
            .unwrap_or_default()
    }

    pub fn visit_snapshot_roots(&self, visitor: &mut dyn FnMut(&FileSystemLocationSnapshot)) {
        if let Some(root) = &self.root {
            root.visit_root_snapshots(visitor);
        }
    }

    pub fn root_snapshots(&self) -> Vec<FileSystemLocationSnapshot> {
        self.root
            .as_ref()
            .map(FileSystemNode::root_snapshots)
            .unwrap_or_default()
    }

    pub fn statistics(&self) -> VfsStatistics {
        let mut statistics = VfsStatistics::default();
        self.visit_snapshot_roots(&mut |snapshot| {
            snapshot.accept(&mut statistics);
        });
        statistics
    }

    pub fn store(
        &self,
        absolute_path: &str,
        snapshot: &MetadataSnapshot,
        diff_listener: &mut dyn NodeDiffListener,
    ) -> Self {
        let target = VfsRelativePath::of(absolute_path);
        let root = match &self.root {
            Some(root) => root.store(target, self.case_sensitivity, snapshot, diff_listener),
            None => FileSystemNode::new_at(target, snapshot, diff_listener),
        };
        Self {
            root: Some(root),
            case_sensitivity: self.case_sensitivity,
        }
    }

    pub fn invalidate(&self, absolute_path: &str, diff_listener: &mut dyn NodeDiffListener) -> Self {
        let root = self.root.as_ref().and_then(|root| {
            root.invalidate(
                VfsRelativePath::of(absolute_path),
                self.case_sensitivity,
                diff_listener,
            )
        });
        Self {
            root,
            case_sensitivity: self.case_sensitivity,
        }
    }
}
