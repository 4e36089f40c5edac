use snapvfs::path::file_name;
use snapvfs::snapshot::{AccessType, DirectorySnapshot, FileMetadata, RegularFileSnapshot};
use snapvfs::tree::hasher::hash_bytes;
use snapvfs::FileSystemLocationSnapshot;

pub fn file(path: &str, content: &str) -> FileSystemLocationSnapshot {
    RegularFileSnapshot::new(
        path,
        file_name(path),
        hash_bytes(content.as_bytes()),
        FileMetadata::new(content.len() as u64, 0, AccessType::Direct),
    )
    .into()
}

pub fn dir(path: &str, children: Vec<FileSystemLocationSnapshot>) -> FileSystemLocationSnapshot {
    DirectorySnapshot::new(path, file_name(path), AccessType::Direct, children).into()
}
