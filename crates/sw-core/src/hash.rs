//! Content hashing: xxhash64 for fast in-memory identity checks, SHA-256
//! for the durable cache key written to [`crate::SignalStore`] (spec.md §3
//! "ContentHasher", §4.8).

use sha2::{Digest, Sha256};
use xxhash_rust::xxh64::xxh64;

/// Dual hash of a byte slice. `fast` is cheap and used for in-memory
/// de-duplication (e.g. detecting a re-submitted identical frame); `digest`
/// is the content-addressed key persisted to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    pub fast: u64,
    pub digest: String,
}

impl ContentHash {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let fast = xxh64(bytes, 0);
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hex_encode(&hasher.finalize());
        ContentHash { fast, digest }
    }

    /// The durable key used for cache lookups and `SignalStore` rows.
    pub fn cache_key(&self) -> &str {
        &self.digest
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(s, "{b:02x}").expect("writing to a String never fails");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_same_hash() {
        let a = ContentHash::of_bytes(b"hello world");
        let b = ContentHash::of_bytes(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn different_bytes_different_digest() {
        let a = ContentHash::of_bytes(b"hello");
        let b = ContentHash::of_bytes(b"world");
        assert_ne!(a.digest, b.digest);
        assert_ne!(a.fast, b.fast);
    }

    #[test]
    fn digest_is_hex_sha256_length() {
        let h = ContentHash::of_bytes(b"x");
        assert_eq!(h.digest.len(), 64);
        assert!(h.digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
