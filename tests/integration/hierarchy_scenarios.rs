use super::support::{dir, file};
use snapvfs::tree::diff::{NoopDiffListener, SnapshotCollectingDiffListener};
use snapvfs::{
    CaseSensitivity, FileSystemLocationSnapshot, FileType, MetadataSnapshot, SnapshotHierarchy,
};

fn store(hierarchy: &SnapshotHierarchy, snapshot: FileSystemLocationSnapshot) -> SnapshotHierarchy {
    let path = snapshot.absolute_path().to_string();
    hierarchy.store(&path, &MetadataSnapshot::Location(snapshot), &mut NoopDiffListener)
}

#[test]
fn sibling_files_and_directory_under_common_parent() {
    let empty = SnapshotHierarchy::empty(CaseSensitivity::CaseSensitive);
    let hierarchy = store(&empty, file("/a/b/file1", "H1"));
    let hierarchy = store(&hierarchy, file("/a/b/file2", "H2"));
    let hierarchy = store(&hierarchy, dir("/a/c", vec![]));

    let a = hierarchy.get_node("/a").expect("node for /a");
    let names: Vec<&str> = a
        .children()
        .expect("children of /a")
        .entries()
        .iter()
        .map(|entry| entry.path())
        .collect();
    assert_eq!(names, vec!["b", "c"]);
    let b = hierarchy.get_node("/a/b").expect("node for /a/b");
    let files: Vec<&str> = b
        .children()
        .expect("children of /a/b")
        .entries()
        .iter()
        .map(|entry| entry.path())
        .collect();
    assert_eq!(files, vec!["file1", "file2"]);
    assert_eq!(
        hierarchy.find_metadata("/a/c").map(|m| m.file_type()),
        Some(FileType::Directory)
    );

    let hierarchy = hierarchy.invalidate("/a/b/file1", &mut NoopDiffListener);
    assert!(hierarchy.find_snapshot("/a/b/file1").is_none());
    assert_eq!(hierarchy.find_snapshot("/a/b/file2"), Some(file("/a/b/file2", "H2")));

    let hierarchy = hierarchy.invalidate("/a/b/file2", &mut NoopDiffListener);
    assert!(hierarchy.get_node("/a/b").is_none());
    assert_eq!(hierarchy.find_snapshot("/a/c"), Some(dir("/a/c", vec![])));
}

#[test]
fn older_versions_stay_untouched() {
    let empty = SnapshotHierarchy::empty(CaseSensitivity::CaseSensitive);
    let before = store(&empty, dir("/p", vec![file("/p/x", "x"), file("/p/y", "y")]));
    let after = before.invalidate("/p/x", &mut NoopDiffListener);

    assert_eq!(before.find_snapshot("/p/x"), Some(file("/p/x", "x")));
    assert!(after.find_snapshot("/p/x").is_none());
    assert_eq!(after.find_snapshot("/p/y"), Some(file("/p/y", "y")));
    assert!(empty.is_empty());
}

#[test]
fn known_snapshots_must_be_invalidated_before_replacing() {
    let empty = SnapshotHierarchy::empty(CaseSensitivity::CaseSensitive);
    let hierarchy = store(&empty, file("/p/x", "old"));

    let mut diff = SnapshotCollectingDiffListener::new();
    let unchanged = hierarchy.store(
        "/p/x",
        &MetadataSnapshot::Location(file("/p/x", "new")),
        &mut diff,
    );
    assert!(diff.is_empty());
    assert_eq!(unchanged.find_snapshot("/p/x"), Some(file("/p/x", "old")));

    let mut diff = SnapshotCollectingDiffListener::new();
    let invalidated = hierarchy.invalidate("/p/x", &mut diff);
    let updated = invalidated.store(
        "/p/x",
        &MetadataSnapshot::Location(file("/p/x", "new")),
        &mut diff,
    );
    assert_eq!(diff.removed_snapshots(), &[file("/p/x", "old")]);
    assert_eq!(diff.added_snapshots(), &[file("/p/x", "new")]);
    assert_eq!(updated.find_snapshot("/p/x"), Some(file("/p/x", "new")));
}

#[test]
fn case_insensitive_lookup() {
    let empty = SnapshotHierarchy::empty(CaseSensitivity::CaseInsensitive);
    let hierarchy = store(&empty, dir("/Proj", vec![file("/Proj/README", "r")]));
    assert!(hierarchy.find_snapshot("/proj/readme").is_some());
    assert!(hierarchy.invalidate("/PROJ", &mut NoopDiffListener).is_empty());
}
