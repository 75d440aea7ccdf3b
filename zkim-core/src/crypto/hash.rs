//! BLAKE3 wrapper: fixed-length hashing, keyed hashing, and XOF output.
//!
//! ZKIM uses BLAKE3 for everything that would otherwise need a family of
//! hash functions: Merkle leaves/nodes, chunk integrity hashes, KDF
//! domain separation, and OPRF trapdoor derivation.

pub const BLAKE3_HASH_BYTES: usize = 32;

pub type Blake3Hash = [u8; BLAKE3_HASH_BYTES];

pub fn blake3_hash(data: &[u8]) -> Blake3Hash {
    *blake3::hash(data).as_bytes()
}

/// Hashes `parts` as if concatenated, without allocating the concatenation.
pub fn blake3_hash_parts(parts: &[&[u8]]) -> Blake3Hash {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// Keyed BLAKE3 (requires a 32-byte key), used for domain-separated MACs
/// distinct from the unkeyed hashes used for Merkle/content integrity.
pub fn blake3_keyed(key: &Blake3Hash, data: &[u8]) -> Blake3Hash {
    *blake3::keyed_hash(key, data).as_bytes()
}

/// Extendable-output hashing, used by the key pipeline to derive more than
/// 32 bytes of key material from a single BLAKE3 context.
pub fn blake3_xof(data: &[u8], out_len: usize) -> Vec<u8> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(data);
    let mut reader = hasher.finalize_xof();
    let mut out = vec![0u8; out_len];
    reader.fill(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(blake3_hash(b"zkim"), blake3_hash(b"zkim"));
        assert_ne!(blake3_hash(b"zkim"), blake3_hash(b"zkim2"));
    }

    #[test]
    fn parts_match_concatenation() {
        let a = blake3_hash_parts(&[b"foo", b"bar"]);
        let b = blake3_hash(b"foobar");
        assert_eq!(a, b);
    }

    #[test]
    fn xof_extends_past_32_bytes() {
        let out = blake3_xof(b"seed", 96);
        assert_eq!(out.len(), 96);
    }
}
