//! CSPRNG access.
//!
//! `OsRng` is used everywhere randomness must be unpredictable (nonces,
//! ephemeral KEM encapsulation). The `kat` feature swaps in a seeded
//! `ChaCha20Rng` so Known Answer Tests can reproduce fixed ciphertexts;
//! it must never be enabled outside test builds.

use rand_core::{OsRng, RngCore};

pub fn fill_random(buf: &mut [u8]) {
    OsRng.fill_bytes(buf);
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    fill_random(&mut buf);
    buf
}

#[cfg(any(test, feature = "kat"))]
pub mod kat {
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    /// Deterministic RNG for reproducible test vectors. Never used outside
    /// `#[cfg(test)]` or the `kat` feature.
    pub fn seeded_rng(seed: u64) -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(seed)
    }
}
