//! Core types shared across the snapshot hierarchy.

/// Hash: 256-bit blake3 digest identifying content or structure
pub type Hash = [u8; 32];

/// Render a hash as lowercase hex
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Render the first `len` bytes of a hash as hex, for compact display
pub fn short_hex(hash: &Hash, len: usize) -> String {
    hex::encode(&hash[..len.min(hash.len())])
}
