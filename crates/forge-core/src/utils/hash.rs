//! Blake3 hashing for release archives.

/// Compute the Blake3 hex digest of data
pub fn blake3_hash(data: &[u8]) -> String {
    let hash = blake3::hash(data);
    hash.to_hex().to_string()
}
