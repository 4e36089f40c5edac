//! Bottom-up construction of directory snapshots

use super::{AccessType, DirectorySnapshot, FileSystemLocationSnapshot};

/// Whether directories without children end up in the result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyDirectoryHandling {
    IncludeEmptyDirs,
    ExcludeEmptyDirs,
}

#[derive(Debug)]
struct DirectoryLevel {
    absolute_path: String,
    name: String,
    access_type: AccessType,
    empty_directory_handling: EmptyDirectoryHandling,
    children: Vec<FileSystemLocationSnapshot>,
}

/// Builds directory snapshots from a depth-first walk.
///
/// Every `enter_directory` must be matched by a `leave_directory`; entries visited
/// in between become children of the innermost open directory.
#[derive(Debug, Default)]
pub struct MerkleDirectorySnapshotBuilder {
    levels: Vec<DirectoryLevel>,
    result: Option<FileSystemLocationSnapshot>,
}

impl MerkleDirectorySnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_directory(
        &mut self,
        access_type: AccessType,
        absolute_path: impl Into<String>,
        name: impl Into<String>,
        empty_directory_handling: EmptyDirectoryHandling,
    ) {
        self.levels.push(DirectoryLevel {
            absolute_path: absolute_path.into(),
            name: name.into(),
            access_type,
            empty_directory_handling,
            children: Vec::new(),
        });
    }

    pub fn visit_leaf_element(&mut self, snapshot: FileSystemLocationSnapshot) {
        self.collect(snapshot);
    }

    /// Adds an already complete directory as a child of the current one
    pub fn visit_directory(&mut self, snapshot: FileSystemLocationSnapshot) {
        self.collect(snapshot);
    }

    /// Drops the innermost directory from the result if it ends up empty, since its
    /// content was only partially visited
    pub fn mark_current_level_as_filtered(&mut self) {
        if let Some(level) = self.levels.last_mut() {
            level.empty_directory_handling = EmptyDirectoryHandling::ExcludeEmptyDirs;
        }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Closes the innermost directory; returns whether it was kept
    pub fn leave_directory(&mut self) -> bool {
        let Some(level) = self.levels.pop() else {
            return false;
        };
        if level.children.is_empty()
            && level.empty_directory_handling == EmptyDirectoryHandling::ExcludeEmptyDirs
        {
            return false;
        }
        let directory = DirectorySnapshot::new(
            level.absolute_path,
            level.name,
            level.access_type,
            level.children,
        );
        self.collect(directory.into());
        true
    }

    fn collect(&mut self, snapshot: FileSystemLocationSnapshot) {
        match self.levels.last_mut() {
            Some(level) => level.children.push(snapshot),
            None => self.result = Some(snapshot),
        }
    }

    /// The outermost completed snapshot
    pub fn result(self) -> Option<FileSystemLocationSnapshot> {
        debug_assert!(self.levels.is_empty(), "unbalanced directory levels");
        self.result
    }
}
