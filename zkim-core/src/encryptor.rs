//! Three-layer encryptor: `spec.md` §4.4.
//!
//! Content layer seals the (possibly compressed) payload under a
//! one-time `content_key`; the user layer wraps that key (plus the
//! metadata fields only the owner should see) under `user_layer_key`;
//! the platform layer wraps search-visible metadata only under
//! `platform_layer_key`. Compromising the platform layer alone must
//! never yield the content key or the payload.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::aead::{XChaCha20Poly1305Aead, AEAD_NONCE_BYTES};
use crate::crypto::rng::random_bytes;
use crate::error::ZkimResult;
use crate::metadata::{Metadata, PlatformMetadata, UserMetadata};

const CONTENT_KEY_BYTES: usize = 32;

#[derive(Serialize, Deserialize)]
struct UserLayerPlaintext {
    file_id: String,
    content_key: [u8; CONTENT_KEY_BYTES],
    /// The content layer's AEAD nonce. Not recoverable from the wire
    /// format any other way: the per-chunk nonces on the wire are
    /// independent hash-domain inputs, not the content nonce.
    content_nonce: [u8; AEAD_NONCE_BYTES],
    metadata: UserMetadata,
}

#[derive(Serialize, Deserialize)]
struct PlatformLayerPlaintext {
    metadata: PlatformMetadata,
}

pub struct EncryptedLayers {
    pub content_ciphertext: Vec<u8>,
    pub content_nonce: [u8; AEAD_NONCE_BYTES],
    pub user_ciphertext: Vec<u8>,
    pub user_nonce: [u8; AEAD_NONCE_BYTES],
    pub platform_ciphertext: Vec<u8>,
    pub platform_nonce: [u8; AEAD_NONCE_BYTES],
}

pub fn encrypt_layers(
    file_id: &str,
    processed_payload: &[u8],
    metadata: &Metadata,
    user_layer_key: &[u8; 32],
    platform_layer_key: &[u8; 32],
) -> ZkimResult<EncryptedLayers> {
    let content_key: Zeroizing<[u8; CONTENT_KEY_BYTES]> = {
        let bytes = random_bytes(CONTENT_KEY_BYTES);
        let mut arr = [0u8; CONTENT_KEY_BYTES];
        arr.copy_from_slice(&bytes);
        Zeroizing::new(arr)
    };
    let content_nonce = random_nonce();
    let content_aead = XChaCha20Poly1305Aead::new(&*content_key)?;
    let content_ciphertext = content_aead.seal(&content_nonce, processed_payload, b"zkim/content")?;

    let user_plaintext = UserLayerPlaintext {
        file_id: file_id.to_string(),
        content_key: *content_key,
        content_nonce,
        metadata: metadata.user_visible_subset(),
    };
    let user_plaintext_bytes = serde_json::to_vec(&user_plaintext)
        .map_err(|_| crate::error::ZkimFailure::new(crate::error::ZkimError::Internal))?;
    let user_nonce = random_nonce();
    let user_aead = XChaCha20Poly1305Aead::new(user_layer_key)?;
    let user_ciphertext = user_aead.seal(&user_nonce, &user_plaintext_bytes, b"zkim/user")?;

    let platform_plaintext = PlatformLayerPlaintext {
        metadata: metadata.platform_visible_subset(),
    };
    let platform_plaintext_bytes = serde_json::to_vec(&platform_plaintext)
        .map_err(|_| crate::error::ZkimFailure::new(crate::error::ZkimError::Internal))?;
    let platform_nonce = random_nonce();
    let platform_aead = XChaCha20Poly1305Aead::new(platform_layer_key)?;
    let platform_ciphertext =
        platform_aead.seal(&platform_nonce, &platform_plaintext_bytes, b"zkim/platform")?;

    Ok(EncryptedLayers {
        content_ciphertext,
        content_nonce,
        user_ciphertext,
        user_nonce,
        platform_ciphertext,
        platform_nonce,
    })
}

pub struct RecoveredUserLayer {
    pub content_key: Zeroizing<[u8; CONTENT_KEY_BYTES]>,
    pub content_nonce: [u8; AEAD_NONCE_BYTES],
    pub file_id: String,
    pub metadata: UserMetadata,
}

/// Recovers `content_key` and `content_nonce` by opening the user layer,
/// per `decrypt`'s first step in `spec.md` §4.7.
pub fn recover_content_key(
    user_ciphertext: &[u8],
    user_nonce: &[u8],
    user_layer_key: &[u8; 32],
) -> ZkimResult<RecoveredUserLayer> {
    let user_aead = XChaCha20Poly1305Aead::new(user_layer_key)?;
    let plaintext = user_aead.open(user_nonce, user_ciphertext, b"zkim/user")?;
    let parsed: UserLayerPlaintext = serde_json::from_slice(&plaintext)
        .map_err(|_| crate::error::ZkimFailure::new(crate::error::ZkimError::InvalidFileStructure))?;
    Ok(RecoveredUserLayer {
        content_key: Zeroizing::new(parsed.content_key),
        content_nonce: parsed.content_nonce,
        file_id: parsed.file_id,
        metadata: parsed.metadata,
    })
}

pub fn open_content(
    content_key: &[u8; CONTENT_KEY_BYTES],
    content_nonce: &[u8],
    content_ciphertext: &[u8],
) -> ZkimResult<Vec<u8>> {
    let aead = XChaCha20Poly1305Aead::new(content_key)?;
    aead.open(content_nonce, content_ciphertext, b"zkim/content")
}

pub fn open_platform_layer(
    platform_ciphertext: &[u8],
    platform_nonce: &[u8],
    platform_layer_key: &[u8; 32],
) -> ZkimResult<PlatformMetadata> {
    let aead = XChaCha20Poly1305Aead::new(platform_layer_key)?;
    let plaintext = aead.open(platform_nonce, platform_ciphertext, b"zkim/platform")?;
    let parsed: PlatformLayerPlaintext = serde_json::from_slice(&plaintext)
        .map_err(|_| crate::error::ZkimFailure::new(crate::error::ZkimError::InvalidFileStructure))?;
    Ok(parsed.metadata)
}

fn random_nonce() -> [u8; AEAD_NONCE_BYTES] {
    let bytes = random_bytes(AEAD_NONCE_BYTES);
    let mut arr = [0u8; AEAD_NONCE_BYTES];
    arr.copy_from_slice(&bytes);
    arr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_recovers_payload_and_metadata() {
        let metadata = Metadata::new("notes.txt", "text/plain", "user-1");
        let user_layer_key = [5u8; 32];
        let platform_layer_key = [6u8; 32];
        let payload = b"confidential payload bytes";

        let layers = encrypt_layers(
            "file-123",
            payload,
            &metadata,
            &user_layer_key,
            &platform_layer_key,
        )
        .unwrap();

        let recovered_layer =
            recover_content_key(&layers.user_ciphertext, &layers.user_nonce, &user_layer_key)
                .unwrap();
        assert_eq!(recovered_layer.file_id, "file-123");
        assert_eq!(recovered_layer.content_nonce, layers.content_nonce);

        let recovered = open_content(
            &recovered_layer.content_key,
            &layers.content_nonce,
            &layers.content_ciphertext,
        )
        .unwrap();
        assert_eq!(recovered, payload);

        let platform_md = open_platform_layer(
            &layers.platform_ciphertext,
            &layers.platform_nonce,
            &platform_layer_key,
        )
        .unwrap();
        assert_eq!(platform_md.file_name, "notes.txt");
    }

    #[test]
    fn platform_layer_never_yields_content_key() {
        let metadata = Metadata::new("a", "b", "c");
        let layers = encrypt_layers("fid", b"secret", &metadata, &[1u8; 32], &[2u8; 32]).unwrap();
        // The platform ciphertext is opened with a different key than the
        // content/user layers and its plaintext schema has no content_key
        // field at all, so there is nothing to extract even with the key.
        let platform_md =
            open_platform_layer(&layers.platform_ciphertext, &layers.platform_nonce, &[2u8; 32])
                .unwrap();
        assert_eq!(platform_md.file_name, "a");
    }
}
