use snapvfs::scan::DirectorySnapshotter;
use snapvfs::tree::hasher::DefaultFileHasher;
use snapvfs::watch::{ChangeEvent, VfsWatcher, WatchConfig};
use snapvfs::{FileType, VfsConfig, VirtualFileSystem};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn workspace() -> TempDir {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("src/nested")).unwrap();
    fs::create_dir_all(temp.path().join(".git")).unwrap();
    fs::write(temp.path().join("src/lib.rs"), b"pub fn lib() {}").unwrap();
    fs::write(temp.path().join("src/nested/mod.rs"), b"mod nested;").unwrap();
    fs::write(temp.path().join(".git/HEAD"), b"ref: refs/heads/main").unwrap();
    fs::write(temp.path().join("README.md"), b"# readme").unwrap();
    temp
}

#[test]
fn snapshot_location_stores_directory_contents() {
    let temp = workspace();
    let vfs = VirtualFileSystem::from_config(&VfsConfig::default());
    let root = vfs.snapshot_location(temp.path()).unwrap();
    assert_eq!(root.file_type(), FileType::Directory);

    let lib = format!("{}/src/lib.rs", root.absolute_path());
    assert_eq!(vfs.find_snapshot(&lib).map(|s| s.file_type()), Some(FileType::RegularFile));
    let git = format!("{}/.git", root.absolute_path());
    assert_eq!(vfs.find_snapshot(&git).map(|s| s.file_type()), Some(FileType::Missing));

    let statistics = vfs.statistics();
    assert_eq!(statistics.regular_files, 3);
    assert_eq!(statistics.directories, 3);
}

#[test]
fn equal_trees_hash_equally() {
    let left = workspace();
    let right = workspace();
    let snapshotter = DirectorySnapshotter::new(
        Arc::new(DefaultFileHasher),
        VfsConfig::default().default_excludes.compile(),
    );
    let left_snapshot = snapshotter.snapshot_location(left.path()).unwrap();
    let right_snapshot = snapshotter.snapshot_location(right.path()).unwrap();
    assert_eq!(left_snapshot.hash(), right_snapshot.hash());

    fs::write(right.path().join("src/nested/mod.rs"), b"mod changed;").unwrap();
    let changed = snapshotter.snapshot_location(right.path()).unwrap();
    assert_ne!(left_snapshot.hash(), changed.hash());
}

#[test]
fn watcher_batch_refreshes_changed_file() {
    let temp = workspace();
    let vfs = Arc::new(VirtualFileSystem::from_config(&VfsConfig::default()));
    let root = vfs.snapshot_location(temp.path()).unwrap();
    let readme = std::path::PathBuf::from(format!("{}/README.md", root.absolute_path()));
    let before = vfs.snapshot_location(&readme).unwrap();

    fs::write(&readme, b"# a longer readme").unwrap();
    let watcher = VfsWatcher::new(Arc::clone(&vfs), WatchConfig::default());
    assert_eq!(watcher.process_events(vec![ChangeEvent::Modified(readme.clone())]), 1);

    let lib = format!("{}/src/lib.rs", root.absolute_path());
    assert!(vfs.find_snapshot(&lib).is_some());
    let after = vfs.snapshot_location(&readme).unwrap();
    assert_ne!(before.hash(), after.hash());
}
