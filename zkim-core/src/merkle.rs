//! Merkle tree over chunk integrity hashes, and the file signer.
//! `spec.md` §4.5.

use crate::crypto::hash::{blake3_hash, blake3_hash_parts, Blake3Hash, BLAKE3_HASH_BYTES};
use crate::crypto::sign::{self, Signature, SigningKey, VerifyingKey};
use crate::error::ZkimResult;

pub const MERKLE_ROOT_BYTES: usize = BLAKE3_HASH_BYTES;

/// Chunk integrity hash: `BLAKE3(nonce || ciphertext)`. Used both when a
/// chunk is first produced (the chunk's random nonce is already assigned
/// at that point, since the content layer is sealed before chunking) and
/// when a chunk is reconstructed from the wire, so the Merkle root a
/// validator recomputes after `parse` is comparable to the one computed
/// at `create` time.
pub fn chunk_integrity_hash(nonce: &[u8], ciphertext: &[u8]) -> Blake3Hash {
    blake3_hash_parts(&[nonce, ciphertext])
}

/// Builds the Merkle root over chunk integrity hashes: each leaf is
/// re-hashed, adjacent hashes are pair-combined with `BLAKE3(a || b)`,
/// the last element of an odd-length level is duplicated, repeated until
/// one root remains. An empty chunk list yields an all-zero root.
pub fn merkle_root(leaf_hashes: &[Blake3Hash]) -> Blake3Hash {
    if leaf_hashes.is_empty() {
        return [0u8; BLAKE3_HASH_BYTES];
    }

    let mut level: Vec<Blake3Hash> = leaf_hashes.iter().map(|h| blake3_hash(h)).collect();

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        level = level
            .chunks(2)
            .map(|pair| blake3_hash_parts(&[&pair[0], &pair[1]]))
            .collect();
    }

    level[0]
}

pub fn manifest_hash(eh_user: &[u8]) -> Blake3Hash {
    blake3_hash(eh_user)
}

/// Message signed by the file signature: `BLAKE3("zkim/root" || root ||
/// manifest_hash || alg_suite_id || version_le_u16)`.
pub fn signing_message(
    merkle_root: &Blake3Hash,
    manifest_hash: &Blake3Hash,
    alg_suite_id: u8,
    version: u16,
) -> Blake3Hash {
    blake3_hash_parts(&[
        b"zkim/root",
        merkle_root,
        manifest_hash,
        &[alg_suite_id],
        &version.to_le_bytes(),
    ])
}

pub fn sign_file(
    user_key: &[u8],
    merkle_root: &Blake3Hash,
    manifest_hash: &Blake3Hash,
    alg_suite_id: u8,
    version: u16,
) -> Signature {
    let (signing_key, _verifying_key): (SigningKey, VerifyingKey) =
        sign::keygen_from_user_key(user_key);
    let message = signing_message(merkle_root, manifest_hash, alg_suite_id, version);
    signing_key.sign(&message)
}

pub fn verify_file_signature(
    user_key: &[u8],
    merkle_root: &Blake3Hash,
    manifest_hash: &Blake3Hash,
    alg_suite_id: u8,
    version: u16,
    signature: &Signature,
) -> ZkimResult<()> {
    let (_signing_key, verifying_key): (SigningKey, VerifyingKey) =
        sign::keygen_from_user_key(user_key);
    let message = signing_message(merkle_root, manifest_hash, alg_suite_id, version);
    verifying_key.verify(&message, signature)
}
