//! File system location snapshots
//!
//! Complete, immutable descriptions of a location on disk: a regular file with its
//! content hash, a directory with its sorted children and Merkle hash, or a location
//! known to be missing. Snapshots are shared between tree versions via `Arc`.

pub mod builder;
pub mod util;
pub mod visitor;

use crate::path::{compare_first_segments, compare_paths, file_name, CaseSensitivity, VfsRelativePath};
use crate::tree::hasher;
use crate::types::Hash;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a location was reached when it was snapshotted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    Direct,
    ViaSymlink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    RegularFile,
    Directory,
    Missing,
}

/// OS level metadata of a regular file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMetadata {
    pub length: u64,
    /// Milliseconds since the Unix epoch
    pub last_modified: i64,
    pub access_type: AccessType,
}

impl FileMetadata {
    pub fn new(length: u64, last_modified: i64, access_type: AccessType) -> Self {
        Self {
            length,
            last_modified,
            access_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegularFileSnapshot {
    absolute_path: String,
    name: String,
    content_hash: Hash,
    metadata: FileMetadata,
}

impl RegularFileSnapshot {
    pub fn new(
        absolute_path: impl Into<String>,
        name: impl Into<String>,
        content_hash: Hash,
        metadata: FileMetadata,
    ) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            name: name.into(),
            content_hash,
            metadata,
        }
    }

    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_hash(&self) -> &Hash {
        &self.content_hash
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    absolute_path: String,
    name: String,
    access_type: AccessType,
    content_hash: Hash,
    children: Vec<FileSystemLocationSnapshot>,
}

impl DirectorySnapshot {
    /// Children are sorted by name, so the hash does not depend on listing order.
    pub fn new(
        absolute_path: impl Into<String>,
        name: impl Into<String>,
        access_type: AccessType,
        mut children: Vec<FileSystemLocationSnapshot>,
    ) -> Self {
        children.sort_by(|left, right| {
            compare_paths(left.name(), right.name(), CaseSensitivity::CaseSensitive)
        });
        let content_hash = hasher::hash_directory(&children);
        Self {
            absolute_path: absolute_path.into(),
            name: name.into(),
            access_type,
            content_hash,
            children,
        }
    }

    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access_type(&self) -> AccessType {
        self.access_type
    }

    pub fn hash(&self) -> &Hash {
        &self.content_hash
    }

    /// Children sorted by name
    pub fn children(&self) -> &[FileSystemLocationSnapshot] {
        &self.children
    }

    /// Child whose name is the first segment of `target`.
    pub fn child(
        &self,
        target: VfsRelativePath<'_>,
        case_sensitivity: CaseSensitivity,
    ) -> Option<&FileSystemLocationSnapshot> {
        self.children
            .binary_search_by(|child| {
                compare_first_segments(child.name(), target.as_str(), case_sensitivity)
            })
            .ok()
            .map(|index| &self.children[index])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFileSnapshot {
    absolute_path: String,
    name: String,
    access_type: AccessType,
}

impl MissingFileSnapshot {
    pub fn new(
        absolute_path: impl Into<String>,
        name: impl Into<String>,
        access_type: AccessType,
    ) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            name: name.into(),
            access_type,
        }
    }

    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access_type(&self) -> AccessType {
        self.access_type
    }
}

/// A complete snapshot of a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSystemLocationSnapshot {
    RegularFile(Arc<RegularFileSnapshot>),
    Directory(Arc<DirectorySnapshot>),
    Missing(Arc<MissingFileSnapshot>),
}

impl FileSystemLocationSnapshot {
    /// Missing snapshot for an absolute path, named after its last segment.
    pub fn missing_at(absolute_path: &str, access_type: AccessType) -> Self {
        MissingFileSnapshot::new(absolute_path, file_name(absolute_path), access_type).into()
    }

    pub fn absolute_path(&self) -> &str {
        match self {
            FileSystemLocationSnapshot::RegularFile(file) => file.absolute_path(),
            FileSystemLocationSnapshot::Directory(directory) => directory.absolute_path(),
            FileSystemLocationSnapshot::Missing(missing) => missing.absolute_path(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FileSystemLocationSnapshot::RegularFile(file) => file.name(),
            FileSystemLocationSnapshot::Directory(directory) => directory.name(),
            FileSystemLocationSnapshot::Missing(missing) => missing.name(),
        }
    }

    pub fn access_type(&self) -> AccessType {
        match self {
            FileSystemLocationSnapshot::RegularFile(file) => file.metadata().access_type,
            FileSystemLocationSnapshot::Directory(directory) => directory.access_type(),
            FileSystemLocationSnapshot::Missing(missing) => missing.access_type(),
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            FileSystemLocationSnapshot::RegularFile(_) => FileType::RegularFile,
            FileSystemLocationSnapshot::Directory(_) => FileType::Directory,
            FileSystemLocationSnapshot::Missing(_) => FileType::Missing,
        }
    }

    pub fn hash(&self) -> Hash {
        match self {
            FileSystemLocationSnapshot::RegularFile(file) => *file.content_hash(),
            FileSystemLocationSnapshot::Directory(directory) => *directory.hash(),
            FileSystemLocationSnapshot::Missing(_) => hasher::missing_file_signature(),
        }
    }

    /// Same kind of location with the same hash; paths and metadata are ignored.
    pub fn is_content_up_to_date(&self, other: &FileSystemLocationSnapshot) -> bool {
        self.file_type() == other.file_type() && self.hash() == other.hash()
    }

    /// Content equality plus equal OS metadata for regular files.
    pub fn is_content_and_metadata_up_to_date(&self, other: &FileSystemLocationSnapshot) -> bool {
        match (self, other) {
            (
                FileSystemLocationSnapshot::RegularFile(left),
                FileSystemLocationSnapshot::RegularFile(right),
            ) => left.content_hash() == right.content_hash() && left.metadata() == right.metadata(),
            _ => self.is_content_up_to_date(other),
        }
    }

    /// Whether both values point at the same shared snapshot
    pub fn ptr_eq(&self, other: &FileSystemLocationSnapshot) -> bool {
        match (self, other) {
            (
                FileSystemLocationSnapshot::RegularFile(left),
                FileSystemLocationSnapshot::RegularFile(right),
            ) => Arc::ptr_eq(left, right),
            (
                FileSystemLocationSnapshot::Directory(left),
                FileSystemLocationSnapshot::Directory(right),
            ) => Arc::ptr_eq(left, right),
            (FileSystemLocationSnapshot::Missing(left), FileSystemLocationSnapshot::Missing(right)) => {
                Arc::ptr_eq(left, right)
            }
            _ => false,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectorySnapshot> {
        match self {
            FileSystemLocationSnapshot::Directory(directory) => Some(directory),
            _ => None,
        }
    }

    /// Snapshot of a location below this one.
    ///
    /// The snapshot is complete, so anything it does not contain is known to be
    /// missing: descendants of files and missing locations, and names a directory
    /// does not list.
    pub fn descendant_snapshot(
        &self,
        target: VfsRelativePath<'_>,
        case_sensitivity: CaseSensitivity,
    ) -> FileSystemLocationSnapshot {
        if target.is_empty() {
            return self.clone();
        }
        match self {
            FileSystemLocationSnapshot::Directory(directory) => {
                match directory.child(target, case_sensitivity) {
                    Some(child) if child.name().len() == target.len() => child.clone(),
                    Some(child) => child
                        .descendant_snapshot(target.path_from_child(child.name()), case_sensitivity),
                    None => FileSystemLocationSnapshot::missing_at(
                        target.absolute_path(),
                        AccessType::Direct,
                    ),
                }
            }
            FileSystemLocationSnapshot::RegularFile(_) | FileSystemLocationSnapshot::Missing(_) => {
                FileSystemLocationSnapshot::missing_at(target.absolute_path(), AccessType::Direct)
            }
        }
    }
}

impl From<RegularFileSnapshot> for FileSystemLocationSnapshot {
    fn from(snapshot: RegularFileSnapshot) -> Self {
        FileSystemLocationSnapshot::RegularFile(Arc::new(snapshot))
    }
}

impl From<DirectorySnapshot> for FileSystemLocationSnapshot {
    fn from(snapshot: DirectorySnapshot) -> Self {
        FileSystemLocationSnapshot::Directory(Arc::new(snapshot))
    }
}

impl From<MissingFileSnapshot> for FileSystemLocationSnapshot {
    fn from(snapshot: MissingFileSnapshot) -> Self {
        FileSystemLocationSnapshot::Missing(Arc::new(snapshot))
    }
}

/// What is known about a single location: either a complete snapshot, or only that
/// it is a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSnapshot {
    Directory(AccessType),
    Location(FileSystemLocationSnapshot),
}

impl MetadataSnapshot {
    pub fn file_type(&self) -> FileType {
        match self {
            MetadataSnapshot::Directory(_) => FileType::Directory,
            MetadataSnapshot::Location(snapshot) => snapshot.file_type(),
        }
    }

    pub fn access_type(&self) -> AccessType {
        match self {
            MetadataSnapshot::Directory(access_type) => *access_type,
            MetadataSnapshot::Location(snapshot) => snapshot.access_type(),
        }
    }

    pub fn as_location(&self) -> Option<&FileSystemLocationSnapshot> {
        match self {
            MetadataSnapshot::Location(snapshot) => Some(snapshot),
            MetadataSnapshot::Directory(_) => None,
        }
    }

    pub fn into_location(self) -> Option<FileSystemLocationSnapshot> {
        match self {
            MetadataSnapshot::Location(snapshot) => Some(snapshot),
            MetadataSnapshot::Directory(_) => None,
        }
    }
}

impl From<FileSystemLocationSnapshot> for MetadataSnapshot {
    fn from(snapshot: FileSystemLocationSnapshot) -> Self {
        MetadataSnapshot::Location(snapshot)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::tree::hasher::hash_bytes;

    pub fn file(absolute_path: &str, content: &str) -> FileSystemLocationSnapshot {
        RegularFileSnapshot::new(
            absolute_path,
            file_name(absolute_path),
            hash_bytes(content.as_bytes()),
            FileMetadata::new(content.len() as u64, 1_000, AccessType::Direct),
        )
        .into()
    }

    pub fn dir(absolute_path: &str, children: Vec<FileSystemLocationSnapshot>) -> FileSystemLocationSnapshot {
        DirectorySnapshot::new(absolute_path, file_name(absolute_path), AccessType::Direct, children)
            .into()
    }

    pub fn missing(absolute_path: &str) -> FileSystemLocationSnapshot {
        FileSystemLocationSnapshot::missing_at(absolute_path, AccessType::Direct)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{dir, file, missing};
    use super::*;

    #[test]
    fn test_directory_hash_independent_of_child_order() {
        let a = file("/root/a", "alpha");
        let b = file("/root/b", "beta");
        let c = dir("/root/c", vec![]);
        let first = dir("/root", vec![a.clone(), b.clone(), c.clone()]);
        let second = dir("/root", vec![c, b, a]);
        assert_eq!(first.hash(), second.hash());
        let names: Vec<&str> = first.as_directory().unwrap().children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_directory_hash_depends_on_names_and_content() {
        let original = dir("/root", vec![file("/root/a", "alpha")]);
        let renamed = dir("/root", vec![file("/root/b", "alpha")]);
        let edited = dir("/root", vec![file("/root/a", "omega")]);
        assert_ne!(original.hash(), renamed.hash());
        assert_ne!(original.hash(), edited.hash());
        // Same content at another location is content-equal
        let moved = dir("/elsewhere", vec![file("/elsewhere/a", "alpha")]);
        assert!(original.is_content_up_to_date(&moved));
    }

    #[test]
    fn test_missing_snapshots_share_sentinel_hash() {
        let first = missing("/a/missing");
        let second = missing("/b/other");
        assert_eq!(first.hash(), second.hash());
        assert!(first.is_content_up_to_date(&second));
        assert_ne!(first, second);
        assert_eq!(second.name(), "other");
    }

    #[test]
    fn test_two_tier_file_comparison() {
        let hash = hasher::hash_bytes(b"content");
        let original: FileSystemLocationSnapshot = RegularFileSnapshot::new(
            "/a/f",
            "f",
            hash,
            FileMetadata::new(7, 1_000, AccessType::Direct),
        )
        .into();
        let touched: FileSystemLocationSnapshot = RegularFileSnapshot::new(
            "/a/f",
            "f",
            hash,
            FileMetadata::new(7, 2_000, AccessType::Direct),
        )
        .into();
        assert!(original.is_content_up_to_date(&touched));
        assert!(!original.is_content_and_metadata_up_to_date(&touched));
        assert!(original.is_content_and_metadata_up_to_date(&original.clone()));
    }

    #[test]
    fn test_kinds_never_content_equal() {
        let empty_dir = dir("/a", vec![]);
        let empty_file = file("/a", "");
        assert!(!empty_dir.is_content_up_to_date(&empty_file));
        assert!(!empty_file.is_content_up_to_date(&missing("/a")));
    }

    #[test]
    fn test_descendant_snapshot_lookup() {
        let tree = dir(
            "/p",
            vec![
                dir("/p/src", vec![file("/p/src/lib.rs", "lib")]),
                file("/p/README", "readme"),
            ],
        );
        let lib = tree.descendant_snapshot(VfsRelativePath::of("/p/src/lib.rs").path_from_child("p"), CaseSensitivity::CaseSensitive);
        assert_eq!(lib.file_type(), FileType::RegularFile);
        assert_eq!(lib.absolute_path(), "/p/src/lib.rs");

        let absent = tree.descendant_snapshot(VfsRelativePath::of("/p/src/main.rs").path_from_child("p"), CaseSensitivity::CaseSensitive);
        assert_eq!(absent.file_type(), FileType::Missing);
        assert_eq!(absent.absolute_path(), "/p/src/main.rs");

        let below_file = tree.descendant_snapshot(VfsRelativePath::of("/p/README/x").path_from_child("p"), CaseSensitivity::CaseSensitive);
        assert_eq!(below_file.file_type(), FileType::Missing);

        let folded = tree.descendant_snapshot(VfsRelativePath::of("/p/SRC/LIB.rs").path_from_child("p"), CaseSensitivity::CaseInsensitive);
        assert_eq!(folded.file_type(), FileType::RegularFile);
    }

    #[test]
    fn test_metadata_snapshot_accessors() {
        let metadata = MetadataSnapshot::Directory(AccessType::ViaSymlink);
        assert_eq!(metadata.file_type(), FileType::Directory);
        assert_eq!(metadata.access_type(), AccessType::ViaSymlink);
        assert!(metadata.as_location().is_none());

        let location: MetadataSnapshot = file("/f", "x").into();
        assert_eq!(location.file_type(), FileType::RegularFile);
        assert!(location.into_location().is_some());
    }
}
