//! XChaCha20-Poly1305 AEAD wrapper.
//!
//! Fixed sizes (wire-format §3):
//!   key   = 32 bytes
//!   nonce = 24 bytes (extended nonce, safe for random generation per-chunk)
//!   tag   = 16 bytes, appended to ciphertext by the underlying crate

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use zeroize::Zeroizing;

use crate::error::{ZkimError, ZkimFailure, ZkimResult};

pub const AEAD_KEY_BYTES: usize = 32;
pub const AEAD_NONCE_BYTES: usize = 24;
pub const AEAD_TAG_BYTES: usize = 16;

/// A single XChaCha20-Poly1305 seal/open operation bound to one key.
pub struct XChaCha20Poly1305Aead {
    key: Zeroizing<[u8; AEAD_KEY_BYTES]>,
}

impl XChaCha20Poly1305Aead {
    pub fn new(key: &[u8]) -> ZkimResult<Self> {
        if key.len() != AEAD_KEY_BYTES {
            return Err(ZkimFailure::new(ZkimError::InvalidKeyLength)
                .with_detail("expected", AEAD_KEY_BYTES.to_string())
                .with_detail("actual", key.len().to_string()));
        }
        let mut buf = [0u8; AEAD_KEY_BYTES];
        buf.copy_from_slice(key);
        Ok(Self {
            key: Zeroizing::new(buf),
        })
    }

    /// Seals `plaintext` under `nonce` and `aad`, returning `ciphertext || tag`.
    pub fn seal(&self, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> ZkimResult<Vec<u8>> {
        let nonce = validate_nonce(nonce)?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&*self.key));
        cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| ZkimFailure::new(ZkimError::Internal))
    }

    /// Opens `ciphertext` (which includes the trailing 16-byte tag).
    pub fn open(&self, nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> ZkimResult<Vec<u8>> {
        if ciphertext.len() < AEAD_TAG_BYTES {
            return Err(ZkimFailure::new(ZkimError::ChunkDataTooShort));
        }
        let nonce = validate_nonce(nonce)?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&*self.key));
        cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| ZkimFailure::new(ZkimError::AuthenticationFailed))
    }
}

fn validate_nonce(nonce: &[u8]) -> ZkimResult<&XNonce> {
    if nonce.len() != AEAD_NONCE_BYTES {
        return Err(ZkimFailure::new(ZkimError::InvalidNonceLength)
            .with_detail("expected", AEAD_NONCE_BYTES.to_string())
            .with_detail("actual", nonce.len().to_string()));
    }
    Ok(XNonce::from_slice(nonce))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = [7u8; AEAD_KEY_BYTES];
        let nonce = [9u8; AEAD_NONCE_BYTES];
        let aead = XChaCha20Poly1305Aead::new(&key).unwrap();
        let ct = aead.seal(&nonce, b"hello zkim", b"aad").unwrap();
        let pt = aead.open(&nonce, &ct, b"aad").unwrap();
        assert_eq!(pt, b"hello zkim");
    }

    #[test]
    fn tamper_detected() {
        let key = [1u8; AEAD_KEY_BYTES];
        let nonce = [2u8; AEAD_NONCE_BYTES];
        let aead = XChaCha20Poly1305Aead::new(&key).unwrap();
        let mut ct = aead.seal(&nonce, b"payload", b"").unwrap();
        *ct.last_mut().unwrap() ^= 0x01;
        assert!(aead.open(&nonce, &ct, b"").is_err());
    }

    #[test]
    fn rejects_short_key() {
        assert!(XChaCha20Poly1305Aead::new(&[0u8; 16]).is_err());
    }
}
