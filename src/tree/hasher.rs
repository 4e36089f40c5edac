//! Hash computation for snapshots
//!
//! Directory hashes are Merkle hashes: a directory signature followed by the
//! `(name, hash)` pair of every child in sorted order. File content hashes come from
//! a `FileHasher`; the tree itself never reads file content.

use crate::error::VfsError;
use crate::snapshot::FileSystemLocationSnapshot;
use crate::types::Hash;
use std::fs::File;
use std::path::Path;
use std::sync::OnceLock;

/// Hash arbitrary bytes
pub fn hash_bytes(bytes: &[u8]) -> Hash {
    *blake3::hash(bytes).as_bytes()
}

/// Signature mixed into every directory hash
pub fn directory_signature() -> Hash {
    static SIGNATURE: OnceLock<Hash> = OnceLock::new();
    *SIGNATURE.get_or_init(|| hash_bytes(b"snapvfs:directory"))
}

/// Hash shared by every missing-file snapshot
pub fn missing_file_signature() -> Hash {
    static SIGNATURE: OnceLock<Hash> = OnceLock::new();
    *SIGNATURE.get_or_init(|| hash_bytes(b"snapvfs:missing-file"))
}

/// Combine already sorted children into a directory hash
pub fn hash_directory(children: &[FileSystemLocationSnapshot]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&directory_signature());
    for child in children {
        let name = child.name().as_bytes();
        hasher.update(&(name.len() as u64).to_le_bytes());
        hasher.update(name);
        hasher.update(&child.hash());
    }
    *hasher.finalize().as_bytes()
}

/// Computes content hashes of regular files.
///
/// Length and modification time are passed along so implementations can cache.
pub trait FileHasher: Send + Sync {
    fn hash(&self, path: &Path, length: u64, last_modified: i64) -> Result<Hash, VfsError>;
}

/// Streams file content through blake3
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFileHasher;

impl FileHasher for DefaultFileHasher {
    fn hash(&self, path: &Path, _length: u64, _last_modified: i64) -> Result<Hash, VfsError> {
        let mut file = File::open(path).map_err(|e| VfsError::io(path, e))?;
        let mut hasher = blake3::Hasher::new();
        std::io::copy(&mut file, &mut hasher).map_err(|e| VfsError::io(path, e))?;
        Ok(*hasher.finalize().as_bytes())
    }
}
