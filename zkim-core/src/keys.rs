//! Key pipeline: derives the per-file envelope keys from a freshly
//! generated ML-KEM-768 keypair and the caller's platform/user keys.

use zeroize::Zeroizing;

use crate::crypto::hash::blake3_hash_parts;
use crate::crypto::kem::{self, KemCiphertext, KemPublicKey, KemSecretKey};
use crate::error::ZkimResult;

pub const LAYER_KEY_BYTES: usize = 32;

pub struct LayerKeys {
    pub kem_public: KemPublicKey,
    pub kem_secret: KemSecretKey,
    pub kem_ciphertext: KemCiphertext,
    pub platform_layer_key: Zeroizing<[u8; LAYER_KEY_BYTES]>,
    pub user_layer_key: Zeroizing<[u8; LAYER_KEY_BYTES]>,
}

/// Generates a fresh ML-KEM-768 keypair, encapsulates to it, and mixes the
/// resulting shared secret with `platform_key`/`user_key` to produce the
/// two envelope layer keys. `spec.md` §4.2.
pub fn derive_layer_keys(platform_key: &[u8; 32], user_key: &[u8; 32]) -> ZkimResult<LayerKeys> {
    let (kem_secret, kem_public) = kem::generate_keypair();
    let (kem_ciphertext, shared_secret) = kem::encapsulate(&kem_public)?;

    let platform_layer_key = blake3_hash_parts(&[shared_secret.as_slice(), platform_key]);
    let user_layer_key = blake3_hash_parts(&[shared_secret.as_slice(), user_key]);
    // `shared_secret` is a `Zeroizing` guard; it wipes itself on drop here.
    drop(shared_secret);

    Ok(LayerKeys {
        kem_public,
        kem_secret,
        kem_ciphertext,
        platform_layer_key: Zeroizing::new(platform_layer_key),
        user_layer_key: Zeroizing::new(user_layer_key),
    })
}

/// Recovers only `user_layer_key`, for callers (like `FileService::decrypt`)
/// that never need the platform key.
pub fn recover_user_layer_key(
    kem_ciphertext: &KemCiphertext,
    kem_secret: &KemSecretKey,
    user_key: &[u8; 32],
) -> ZkimResult<Zeroizing<[u8; LAYER_KEY_BYTES]>> {
    let shared_secret = kem::decapsulate(kem_secret, kem_ciphertext)?;
    let user_layer_key = blake3_hash_parts(&[shared_secret.as_slice(), user_key]);
    drop(shared_secret);
    Ok(Zeroizing::new(user_layer_key))
}

/// Reverses `derive_layer_keys` given the stored KEM secret and ciphertext.
pub fn recover_layer_keys(
    kem_ciphertext: &KemCiphertext,
    kem_secret: &KemSecretKey,
    platform_key: &[u8; 32],
    user_key: &[u8; 32],
) -> ZkimResult<(
    Zeroizing<[u8; LAYER_KEY_BYTES]>,
    Zeroizing<[u8; LAYER_KEY_BYTES]>,
)> {
    let shared_secret = kem::decapsulate(kem_secret, kem_ciphertext)?;

    let platform_layer_key = blake3_hash_parts(&[shared_secret.as_slice(), platform_key]);
    let user_layer_key = blake3_hash_parts(&[shared_secret.as_slice(), user_key]);
    drop(shared_secret);

    Ok((
        Zeroizing::new(platform_layer_key),
        Zeroizing::new(user_layer_key),
    ))
}
