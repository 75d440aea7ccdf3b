//! ML-DSA-65 signatures (FIPS 204 / CRYSTALS-Dilithium successor).
//!
//! The file signature covers `BLAKE3("zkim/root" || merkle_root ||
//! manifest_hash || alg_suite_id || version_le_u16)`. The signing keypair
//! itself is not stored anywhere on the wire: it is re-derived
//! deterministically from the user key on every sign/verify call via
//! `BLAKE3(user_key || "zkim/ml-dsa-65/file")`, seeding a CSPRNG the same
//! way the encapsulation layer seeds deterministic test vectors.

use ml_dsa::{KeyGen, MlDsa65, Signature as MlDsaSignature};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

use crate::crypto::hash::blake3_xof;
use crate::error::{ZkimError, ZkimFailure, ZkimResult};

pub use ml_dsa::{SigningKey as InnerSigningKey, VerifyingKey as InnerVerifyingKey};

pub const SIGNATURE_BYTES: usize = 3309;
pub const VERIFYING_KEY_BYTES: usize = 1952;

const SEED_CONTEXT: &[u8] = b"zkim/ml-dsa-65/file";

pub struct SigningKey(InnerSigningKey<MlDsa65>);
pub struct VerifyingKey(InnerVerifyingKey<MlDsa65>);
pub struct Signature(MlDsaSignature<MlDsa65>);

/// Derives the ML-DSA-65 keypair deterministically from `user_key`.
///
/// BLAKE3's XOF output seeds a `ChaCha20Rng`, which in turn drives the
/// crate's key generation. Re-deriving from the same `user_key` always
/// yields the same keypair, so the signing key never needs to be persisted.
pub fn keygen_from_user_key(user_key: &[u8]) -> (SigningKey, VerifyingKey) {
    let seed_material = blake3_xof(&[user_key, SEED_CONTEXT].concat(), 32);
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&seed_material);
    let mut rng = ChaCha20Rng::from_seed(seed);
    let kp = MlDsa65::key_gen(&mut rng);
    (
        SigningKey(kp.signing_key().clone()),
        VerifyingKey(kp.verifying_key().clone()),
    )
}

impl SigningKey {
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message))
    }
}

impl VerifyingKey {
    pub fn to_bytes(&self) -> [u8; VERIFYING_KEY_BYTES] {
        let mut out = [0u8; VERIFYING_KEY_BYTES];
        out.copy_from_slice(self.0.encode().as_slice());
        out
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> ZkimResult<()> {
        self.0
            .verify(message, &signature.0)
            .then_some(())
            .ok_or_else(|| ZkimFailure::new(ZkimError::AuthenticationFailed))
    }
}

impl Signature {
    pub fn to_bytes(&self) -> ZkimResult<[u8; SIGNATURE_BYTES]> {
        let encoded = self.0.encode();
        let arr: [u8; SIGNATURE_BYTES] = encoded.as_slice().try_into().map_err(|_| {
            ZkimFailure::new(ZkimError::InvalidSignatureLength)
                .with_detail("expected", SIGNATURE_BYTES.to_string())
        })?;
        Ok(arr)
    }

    pub fn from_bytes(bytes: &[u8]) -> ZkimResult<Self> {
        if bytes.len() != SIGNATURE_BYTES {
            return Err(ZkimFailure::new(ZkimError::InvalidSignatureLength)
                .with_detail("expected", SIGNATURE_BYTES.to_string())
                .with_detail("actual", bytes.len().to_string()));
        }
        let sig = MlDsaSignature::<MlDsa65>::decode(bytes)
            .ok_or_else(|| ZkimFailure::new(ZkimError::InvalidSignatureLength))?;
        Ok(Self(sig))
    }
}
