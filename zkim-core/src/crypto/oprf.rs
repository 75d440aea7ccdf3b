//! Oblivious pseudo-random function over Ristretto255, used to derive
//! search tokens and trapdoors without the index ever storing the
//! plaintext keyword it scored a match against.
//!
//! `spec.md` §4.8 specifies a single-party evaluation, not a two-round
//! blind protocol: the component holding the secret scalar `k` computes
//! `F(k, x) = BASE · (h(x) · k)` directly over the term `x` it already
//! has in hand (a metadata tag at indexing time, a query string at
//! search time). The "oblivious" property here is about what the index
//! *persists* — OPRF outputs, never the term itself — not about hiding
//! the term from the party doing the evaluation. `zkim-index` is the
//! only caller of `evaluate`; it never ships `x` to a third party.
//!
//! Scalar reduction: the 32-byte BLAKE3 digest of `x` is interpreted as
//! a little-endian integer and reduced modulo the Ristretto255 group
//! order via `Scalar::from_bytes_mod_order` (`spec.md` §4.8 step 2, §9
//! Open Question 3). The same reduction is used for the secret key
//! itself so indexing and querying stay self-consistent by construction.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use zeroize::Zeroizing;

use crate::crypto::hash::{blake3_hash, Blake3Hash};
use crate::crypto::rng::fill_random;

pub const OPRF_OUTPUT_BYTES: usize = 32;
pub const OPRF_SECRET_BYTES: usize = 32;

/// Reduces a 32-byte BLAKE3 digest to a Ristretto255 scalar via a
/// little-endian interpretation modulo the group order.
pub fn scalar_from_hash(bytes: &Blake3Hash) -> Scalar {
    Scalar::from_bytes_mod_order(*bytes)
}

/// The index's long-lived OPRF secret scalar. Generated once at
/// `SearchableIndex::new` and zeroized on `cleanup`.
pub struct OprfSecretKey(Scalar);

impl OprfSecretKey {
    /// Generates a fresh secret scalar from 32 bytes of CSPRNG output,
    /// reduced the same way `scalar_from_hash` reduces term hashes.
    pub fn generate() -> Self {
        let mut bytes = [0u8; OPRF_SECRET_BYTES];
        fill_random(&mut bytes);
        Self(scalar_from_hash(&bytes))
    }

    pub fn from_bytes(bytes: &[u8; OPRF_SECRET_BYTES]) -> Self {
        Self(scalar_from_hash(bytes))
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; OPRF_SECRET_BYTES]> {
        Zeroizing::new(self.0.to_bytes())
    }

    /// `F(k, x)`: the exact 5-step procedure of `spec.md` §4.8.
    pub fn evaluate(&self, term: &[u8]) -> [u8; OPRF_OUTPUT_BYTES] {
        let h = blake3_hash(term);
        let h_scalar = scalar_from_hash(&h);
        let p: RistrettoPoint = RISTRETTO_BASEPOINT_POINT * h_scalar;
        let r = p * self.0;
        r.compress().to_bytes()
    }

    /// Overwrites the secret scalar with zero in place. `spec.md` §5
    /// requires the OPRF secret key to be wiped on every exit path; called
    /// from `zkim_index::SearchableIndex::cleanup`.
    pub fn zeroize(&mut self) {
        use zeroize::Zeroize;
        self.0.zeroize();
    }
}
