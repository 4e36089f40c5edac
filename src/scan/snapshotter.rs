//! Snapshots of locations on disk
//!
//! Directories are walked depth-first with `walkdir`, following symbolic links.
//! Entries reached through a link keep the path below the link and are marked
//! `ViaSymlink`. Links that point nowhere become missing snapshots, and link
//! cycles are skipped so every file is included once.

use super::excludes::DefaultExcludes;
use crate::error::VfsError;
use crate::snapshot::builder::{EmptyDirectoryHandling, MerkleDirectorySnapshotBuilder};
use crate::snapshot::{AccessType, FileMetadata, FileSystemLocationSnapshot, RegularFileSnapshot};
use crate::tree::hasher::FileHasher;
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Decides which entries below the walked root are part of a snapshot
pub trait DirectoryWalkerPredicate {
    /// `relative_path` holds the segments from the root to `name`, inclusive
    fn test(&self, path: &Path, name: &str, is_directory: bool, relative_path: &[String]) -> bool;
}

impl<F> DirectoryWalkerPredicate for F
where
    F: Fn(&Path, &str, bool, &[String]) -> bool,
{
    fn test(&self, path: &Path, name: &str, is_directory: bool, relative_path: &[String]) -> bool {
        self(path, name, is_directory, relative_path)
    }
}

/// A snapshot together with whether a predicate left anything out of it
#[derive(Debug, Clone)]
pub struct SnapshotResult {
    pub snapshot: FileSystemLocationSnapshot,
    pub filtered: bool,
}

/// Counters of a single directory walk
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStatistics {
    pub visited_files: usize,
    pub visited_directories: usize,
}

pub struct DirectorySnapshotter {
    hasher: Arc<dyn FileHasher>,
    default_excludes: DefaultExcludes,
}

impl DirectorySnapshotter {
    pub fn new(hasher: Arc<dyn FileHasher>, default_excludes: DefaultExcludes) -> Self {
        Self {
            hasher,
            default_excludes,
        }
    }

    /// Snapshot of whatever is at `path`: a file, a directory or nothing
    pub fn snapshot_location(&self, path: &Path) -> Result<FileSystemLocationSnapshot, VfsError> {
        let absolute = absolute_path(path)?;
        let absolute_str = path_to_string(&absolute)?;
        let link_metadata = match std::fs::symlink_metadata(&absolute) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(FileSystemLocationSnapshot::missing_at(&absolute_str, AccessType::Direct));
            }
            Err(e) => return Err(VfsError::io(&absolute, e)),
        };
        let access_type = if link_metadata.file_type().is_symlink() {
            AccessType::ViaSymlink
        } else {
            AccessType::Direct
        };
        let metadata = match std::fs::metadata(&absolute) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(FileSystemLocationSnapshot::missing_at(&absolute_str, access_type));
            }
            Err(e) => return Err(VfsError::io(&absolute, e)),
        };
        if metadata.is_dir() {
            Ok(self.snapshot_directory(&absolute, None)?.snapshot)
        } else {
            self.snapshot_file(&absolute, &absolute_str, file_name_of(&absolute)?, &metadata, access_type)
        }
    }

    /// Snapshot of the directory at `path`, optionally filtered by `predicate`
    pub fn snapshot_directory(
        &self,
        path: &Path,
        predicate: Option<&dyn DirectoryWalkerPredicate>,
    ) -> Result<SnapshotResult, VfsError> {
        let root = absolute_path(path)?;
        let mut walk = DirectoryWalk {
            snapshotter: self,
            root: &root,
            predicate,
            builder: MerkleDirectorySnapshotBuilder::new(),
            filtered: false,
            statistics: WalkStatistics::default(),
        };
        let snapshot = walk.run()?;
        debug!(
            root = %root.display(),
            files = walk.statistics.visited_files,
            directories = walk.statistics.visited_directories,
            filtered = walk.filtered,
            "Snapshotted directory"
        );
        Ok(SnapshotResult {
            snapshot,
            filtered: walk.filtered,
        })
    }

    fn snapshot_file(
        &self,
        path: &Path,
        absolute_path: &str,
        name: &str,
        metadata: &Metadata,
        access_type: AccessType,
    ) -> Result<FileSystemLocationSnapshot, VfsError> {
        if !metadata.is_file() {
            return Err(VfsError::UnsupportedFileType(absolute_path.to_string()));
        }
        let last_modified = last_modified_millis(metadata);
        let length = metadata.len();
        let hash = self.hasher.hash(path, length, last_modified)?;
        Ok(RegularFileSnapshot::new(
            absolute_path,
            name,
            hash,
            FileMetadata::new(length, last_modified, access_type),
        )
        .into())
    }
}

struct DirectoryWalk<'a> {
    snapshotter: &'a DirectorySnapshotter,
    root: &'a Path,
    predicate: Option<&'a dyn DirectoryWalkerPredicate>,
    builder: MerkleDirectorySnapshotBuilder,
    filtered: bool,
    statistics: WalkStatistics,
}

impl DirectoryWalk<'_> {
    fn run(&mut self) -> Result<FileSystemLocationSnapshot, VfsError> {
        let mut entries = WalkDir::new(self.root).follow_links(true).into_iter();
        while let Some(next) = entries.next() {
            match next {
                Ok(entry) => {
                    self.leave_directories_down_to(entry.depth());
                    let is_directory = entry.file_type().is_dir();
                    if entry.depth() > 0 && !self.should_visit(entry.path(), is_directory)? {
                        if is_directory {
                            entries.skip_current_dir();
                        }
                        continue;
                    }
                    self.visit(&entry)?;
                }
                Err(error) => self.visit_failed(error)?,
            }
        }
        self.leave_directories_down_to(0);
        match std::mem::take(&mut self.builder).result() {
            Some(snapshot) => Ok(snapshot),
            None => {
                let root = path_to_string(self.root)?;
                Ok(FileSystemLocationSnapshot::missing_at(&root, AccessType::Direct))
            }
        }
    }

    fn leave_directories_down_to(&mut self, depth: usize) {
        while self.builder.depth() > depth {
            self.builder.leave_directory();
        }
    }

    fn access_type(entry: &DirEntry) -> AccessType {
        if entry.path_is_symlink() {
            AccessType::ViaSymlink
        } else {
            AccessType::Direct
        }
    }

    fn visit(&mut self, entry: &DirEntry) -> Result<(), VfsError> {
        let path = entry.path();
        let absolute = path_to_string(path)?;
        let name = if entry.depth() == 0 {
            crate::path::file_name(&absolute).to_string()
        } else {
            file_name_of(path)?.to_string()
        };
        if entry.file_type().is_dir() {
            self.statistics.visited_directories += 1;
            self.builder.enter_directory(
                Self::access_type(entry),
                absolute,
                name,
                EmptyDirectoryHandling::IncludeEmptyDirs,
            );
            return Ok(());
        }
        self.statistics.visited_files += 1;
        let metadata = entry.metadata().map_err(|source| VfsError::Walk {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot =
            self.snapshotter
                .snapshot_file(path, &absolute, &name, &metadata, Self::access_type(entry))?;
        self.builder.visit_leaf_element(snapshot);
        Ok(())
    }

    fn visit_failed(&mut self, error: walkdir::Error) -> Result<(), VfsError> {
        // Cycles through links are skipped, everything else in them is kept
        if error.loop_ancestor().is_some() {
            return Ok(());
        }
        let Some(path) = error.path().map(Path::to_path_buf) else {
            return Err(VfsError::Walk {
                path: self.root.to_path_buf(),
                source: error,
            });
        };
        self.leave_directories_down_to(error.depth());
        let is_link = std::fs::symlink_metadata(&path)
            .map(|metadata| metadata.file_type().is_symlink())
            .unwrap_or(false);
        let not_found = error
            .io_error()
            .map(|io| io.kind() == ErrorKind::NotFound)
            .unwrap_or(false);
        if is_link && not_found {
            if !self.should_visit(&path, false)? {
                return Ok(());
            }
            let absolute = path_to_string(&path)?;
            self.statistics.visited_files += 1;
            self.builder
                .visit_leaf_element(FileSystemLocationSnapshot::missing_at(&absolute, AccessType::ViaSymlink));
            return Ok(());
        }
        if error.depth() > 0 && !self.should_visit(&path, path.is_dir())? {
            return Ok(());
        }
        Err(VfsError::Walk {
            path,
            source: error,
        })
    }

    /// Excluded entries are skipped silently; entries the predicate rejects mark
    /// the walk as filtered
    fn should_visit(&mut self, path: &Path, is_directory: bool) -> Result<bool, VfsError> {
        let name = file_name_of(path)?;
        if self.snapshotter.default_excludes.excludes(name, is_directory) {
            return Ok(false);
        }
        let Some(predicate) = self.predicate else {
            return Ok(true);
        };
        let relative_path = relative_segments(self.root, path)?;
        let allowed = predicate.test(path, name, is_directory, &relative_path);
        if !allowed {
            self.filtered = true;
            if self.builder.depth() > 1 {
                self.builder.mark_current_level_as_filtered();
            }
        }
        Ok(allowed)
    }
}

fn relative_segments(root: &Path, path: &Path) -> Result<Vec<String>, VfsError> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| {
            component
                .as_os_str()
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| VfsError::NonUtf8Path(path.to_path_buf()))
        })
        .collect()
}

/// `path` made absolute against the current directory, without resolving links
pub fn absolute_path(path: &Path) -> Result<PathBuf, VfsError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let current = std::env::current_dir().map_err(|e| VfsError::io(path, e))?;
        current.join(path)
    };
    Ok(dunce::simplified(&absolute).to_path_buf())
}

pub fn path_to_string(path: &Path) -> Result<String, VfsError> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| VfsError::NonUtf8Path(path.to_path_buf()))
}

fn file_name_of(path: &Path) -> Result<&str, VfsError> {
    match path.file_name() {
        Some(name) => name.to_str().ok_or_else(|| VfsError::NonUtf8Path(path.to_path_buf())),
        None => Ok(""),
    }
}

fn last_modified_millis(metadata: &Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
        .map(|duration| duration.as_millis() as i64)
        .unwrap_or(0)
}
