//! Depth-first visitors over snapshot hierarchies

use super::{DirectorySnapshot, FileSystemLocationSnapshot};
use crate::path::RelativePathTracker;

/// Outcome of visiting one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotVisitResult {
    /// Visit the children of a directory, then its siblings
    Continue,
    /// Do not descend into this directory
    SkipSubtree,
    /// Stop the whole walk
    Terminate,
}

/// Visitor for snapshot hierarchies.
///
/// `visit_entry` is called for every location, parents before children.
/// `enter_directory`/`leave_directory` bracket the children of directories whose
/// entry returned `Continue`.
pub trait FileSystemSnapshotHierarchyVisitor {
    fn enter_directory(&mut self, _directory: &DirectorySnapshot) {}

    fn visit_entry(&mut self, snapshot: &FileSystemLocationSnapshot) -> SnapshotVisitResult;

    fn leave_directory(&mut self, _directory: &DirectorySnapshot) {}
}

/// Visitor that receives the path of each entry relative to the root of the walk
pub trait RelativePathTrackingVisitor {
    fn enter_directory(&mut self, _directory: &DirectorySnapshot, _tracker: &RelativePathTracker) {}

    fn visit_entry(
        &mut self,
        snapshot: &FileSystemLocationSnapshot,
        tracker: &RelativePathTracker,
    ) -> SnapshotVisitResult;

    fn leave_directory(&mut self, _directory: &DirectorySnapshot, _tracker: &RelativePathTracker) {}
}

impl FileSystemLocationSnapshot {
    pub fn accept(&self, visitor: &mut dyn FileSystemSnapshotHierarchyVisitor) -> SnapshotVisitResult {
        match visitor.visit_entry(self) {
            SnapshotVisitResult::Continue => {
                if let FileSystemLocationSnapshot::Directory(directory) = self {
                    visitor.enter_directory(directory);
                    for child in directory.children() {
                        if child.accept(visitor) == SnapshotVisitResult::Terminate {
                            return SnapshotVisitResult::Terminate;
                        }
                    }
                    visitor.leave_directory(directory);
                }
                SnapshotVisitResult::Continue
            }
            SnapshotVisitResult::SkipSubtree => SnapshotVisitResult::Continue,
            SnapshotVisitResult::Terminate => SnapshotVisitResult::Terminate,
        }
    }

    pub fn accept_tracking(
        &self,
        tracker: &mut RelativePathTracker,
        visitor: &mut dyn RelativePathTrackingVisitor,
    ) -> SnapshotVisitResult {
        tracker.enter(self.name());
        let result = match visitor.visit_entry(self, tracker) {
            SnapshotVisitResult::Continue => {
                if let FileSystemLocationSnapshot::Directory(directory) = self {
                    visitor.enter_directory(directory, tracker);
                    for child in directory.children() {
                        if child.accept_tracking(tracker, visitor) == SnapshotVisitResult::Terminate {
                            tracker.leave();
                            return SnapshotVisitResult::Terminate;
                        }
                    }
                    visitor.leave_directory(directory, tracker);
                }
                SnapshotVisitResult::Continue
            }
            SnapshotVisitResult::SkipSubtree => SnapshotVisitResult::Continue,
            SnapshotVisitResult::Terminate => SnapshotVisitResult::Terminate,
        };
        tracker.leave();
        result
    }
}

/// Visit several roots in order, stopping when one terminates
pub fn accept_all<'a>(
    roots: impl IntoIterator<Item = &'a FileSystemLocationSnapshot>,
    visitor: &mut dyn FileSystemSnapshotHierarchyVisitor,
) -> SnapshotVisitResult {
    for root in roots {
        if root.accept(visitor) == SnapshotVisitResult::Terminate {
            return SnapshotVisitResult::Terminate;
        }
    }
    SnapshotVisitResult::Continue
}

impl<F> FileSystemSnapshotHierarchyVisitor for F
where
    F: FnMut(&FileSystemLocationSnapshot) -> SnapshotVisitResult,
{
    fn visit_entry(&mut self, snapshot: &FileSystemLocationSnapshot) -> SnapshotVisitResult {
        self(snapshot)
    }
}
