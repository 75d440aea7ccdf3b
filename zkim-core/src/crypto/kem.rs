//! ML-KEM-768 key encapsulation (FIPS 203), pure post-quantum form.
//!
//! Unlike a hybrid classical+PQ construction, the container format commits
//! to a single fixed-size ciphertext on the wire:
//!
//!   KEM Ciphertext = mlkem_ct[1088]   (§2.2 of the wire format)
//!
//! and a single 32-byte shared secret, which the key pipeline then expands
//! into the three envelope layers.

use ml_kem::kem::{Decapsulate, Encapsulate};
use ml_kem::{Ciphertext, EncodedSizeUser, KemCore, MlKem768Params};
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::error::{ZkimError, ZkimFailure, ZkimResult};

pub use ml_kem::MlKem768;

pub const KEM_PUBLIC_KEY_BYTES: usize = 1184;
pub const KEM_SECRET_KEY_BYTES: usize = 2400;
pub const KEM_CIPHERTEXT_BYTES: usize = 1088;
pub const SHARED_SECRET_BYTES: usize = 32;

type Ek = ml_kem::kem::EncapsulationKey<MlKem768Params>;
type Dk = ml_kem::kem::DecapsulationKey<MlKem768Params>;
type MlKemCt = Ciphertext<MlKem768>;

#[derive(Clone)]
pub struct KemPublicKey(Ek);

pub struct KemSecretKey(Dk);

#[derive(Clone)]
pub struct KemCiphertext(pub [u8; KEM_CIPHERTEXT_BYTES]);

impl KemPublicKey {
    pub fn to_bytes(&self) -> [u8; KEM_PUBLIC_KEY_BYTES] {
        let mut out = [0u8; KEM_PUBLIC_KEY_BYTES];
        out.copy_from_slice(self.0.as_bytes().as_slice());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> ZkimResult<Self> {
        let arr: [u8; KEM_PUBLIC_KEY_BYTES] = bytes.try_into().map_err(|_| {
            ZkimFailure::new(ZkimError::InvalidKeyLength)
                .with_detail("expected", KEM_PUBLIC_KEY_BYTES.to_string())
                .with_detail("actual", bytes.len().to_string())
        })?;
        Ok(Self(Ek::from_bytes(&arr.into())))
    }
}

impl KemSecretKey {
    pub fn to_bytes(&self) -> Zeroizing<[u8; KEM_SECRET_KEY_BYTES]> {
        let mut out = [0u8; KEM_SECRET_KEY_BYTES];
        out.copy_from_slice(self.0.as_bytes().as_slice());
        Zeroizing::new(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> ZkimResult<Self> {
        let arr: [u8; KEM_SECRET_KEY_BYTES] = bytes.try_into().map_err(|_| {
            ZkimFailure::new(ZkimError::InvalidKeyLength)
                .with_detail("expected", KEM_SECRET_KEY_BYTES.to_string())
                .with_detail("actual", bytes.len().to_string())
        })?;
        Ok(Self(Dk::from_bytes(&arr.into())))
    }
}

impl KemCiphertext {
    pub fn from_bytes(bytes: &[u8]) -> ZkimResult<Self> {
        let arr: [u8; KEM_CIPHERTEXT_BYTES] = bytes.try_into().map_err(|_| {
            ZkimFailure::new(ZkimError::InvalidKemCiphertextLength)
                .with_detail("expected", KEM_CIPHERTEXT_BYTES.to_string())
                .with_detail("actual", bytes.len().to_string())
        })?;
        Ok(Self(arr))
    }
}

/// Generates a fresh ML-KEM-768 keypair.
pub fn generate_keypair() -> (KemSecretKey, KemPublicKey) {
    let (dk, ek) = ml_kem::MlKem768::generate(&mut OsRng);
    (KemSecretKey(dk), KemPublicKey(ek))
}

/// Encapsulates against `recipient`, returning the wire ciphertext and the
/// 32-byte shared secret the key pipeline expands into layer keys.
pub fn encapsulate(
    recipient: &KemPublicKey,
) -> ZkimResult<(KemCiphertext, Zeroizing<[u8; SHARED_SECRET_BYTES]>)> {
    let (ct, ss) = recipient
        .0
        .encapsulate(&mut OsRng)
        .map_err(|_| ZkimFailure::new(ZkimError::Internal))?;
    let mut ct_bytes = [0u8; KEM_CIPHERTEXT_BYTES];
    ct_bytes.copy_from_slice(ct.as_slice());
    let mut ss_bytes = [0u8; SHARED_SECRET_BYTES];
    ss_bytes.copy_from_slice(ss.as_slice());
    Ok((KemCiphertext(ct_bytes), Zeroizing::new(ss_bytes)))
}

/// Decapsulates `ciphertext` under `secret`, recovering the shared secret.
pub fn decapsulate(
    secret: &KemSecretKey,
    ciphertext: &KemCiphertext,
) -> ZkimResult<Zeroizing<[u8; SHARED_SECRET_BYTES]>> {
    let ct = MlKemCt::try_from(ciphertext.0.as_slice())
        .map_err(|_| ZkimFailure::new(ZkimError::InvalidKemCiphertextLength))?;
    let ss = secret
        .0
        .decapsulate(&ct)
        .map_err(|_| ZkimFailure::new(ZkimError::AuthenticationFailed))?;
    let mut ss_bytes = [0u8; SHARED_SECRET_BYTES];
    ss_bytes.copy_from_slice(ss.as_slice());
    Ok(Zeroizing::new(ss_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encapsulate_decapsulate_agree() {
        let (sk, pk) = generate_keypair();
        let (ct, ss1) = encapsulate(&pk).unwrap();
        let ss2 = decapsulate(&sk, &ct).unwrap();
        assert_eq!(*ss1, *ss2);
    }

    #[test]
    fn public_key_round_trips() {
        let (_, pk) = generate_keypair();
        let bytes = pk.to_bytes();
        let pk2 = KemPublicKey::from_bytes(&bytes).unwrap();
        assert_eq!(pk2.to_bytes(), bytes);
    }

    #[test]
    fn ciphertext_rejects_wrong_length() {
        assert!(KemCiphertext::from_bytes(&[0u8; 10]).is_err());
    }
}
