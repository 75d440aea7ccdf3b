//! Cryptographic primitives used by the ZKIM container format.
//!
//! Each submodule wraps exactly one primitive and exposes a narrow,
//! byte-oriented API so the rest of the crate never touches a third-party
//! crypto crate directly.

pub mod aead;
pub mod ct;
pub mod hash;
pub mod kem;
pub mod oprf;
pub mod rng;
pub mod sign;

pub use aead::{XChaCha20Poly1305Aead, AEAD_KEY_BYTES, AEAD_NONCE_BYTES, AEAD_TAG_BYTES};
pub use hash::{blake3_hash, blake3_keyed, blake3_xof, Blake3Hash, BLAKE3_HASH_BYTES};
pub use kem::{KemCiphertext, KemPublicKey, KemSecretKey, MlKem768, KEM_CIPHERTEXT_BYTES};
pub use oprf::{scalar_from_hash, OprfSecretKey, OPRF_OUTPUT_BYTES, OPRF_SECRET_BYTES};
pub use sign::{Signature, SigningKey, VerifyingKey, SIGNATURE_BYTES};
