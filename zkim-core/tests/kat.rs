//! Known-answer / wire-layout tests: `spec.md` §4.6, §8.

use zkim_core::crypto::kem::KEM_CIPHERTEXT_BYTES;
use zkim_core::crypto::sign::SIGNATURE_BYTES;
use zkim_core::wire::{
    self, EncryptionHeader, WireChunk, WireFile, ALG_SUITE_ID, CHUNKS_OFFSET, EH_BYTES,
    EH_PLATFORM_OFFSET, EH_USER_OFFSET, FLAGS, HEADER_BYTES, KEM_CT_OFFSET, MAGIC,
    MERKLE_ROOT_BYTES, VERSION,
};

#[test]
fn wire_constants_match_spec() {
    assert_eq!(MAGIC, *b"ZKIM");
    assert_eq!(VERSION, 0x0001);
    assert_eq!(FLAGS, 0x0000);
    assert_eq!(ALG_SUITE_ID, 0x01);
    assert_eq!(HEADER_BYTES, 8);
    assert_eq!(KEM_CIPHERTEXT_BYTES, 1088);
    assert_eq!(EH_BYTES, 40);
    assert_eq!(MERKLE_ROOT_BYTES, 32);
    assert_eq!(KEM_CT_OFFSET, 8);
    assert_eq!(EH_PLATFORM_OFFSET, 8 + 1088);
    assert_eq!(EH_USER_OFFSET, 8 + 1088 + 40);
    assert_eq!(CHUNKS_OFFSET, 8 + 1088 + 40 + 40);
}

fn sample_wire_file(chunks: Vec<WireChunk>) -> WireFile {
    WireFile {
        kem_ciphertext: [0x11u8; KEM_CIPHERTEXT_BYTES],
        eh_platform: EncryptionHeader {
            nonce: [0x22u8; 24],
            tag: [0x33u8; 16],
        },
        eh_user: EncryptionHeader {
            nonce: [0x44u8; 24],
            tag: [0x55u8; 16],
        },
        chunks,
        merkle_root: [0x66u8; MERKLE_ROOT_BYTES],
        file_signature: [0x77u8; SIGNATURE_BYTES],
    }
}

#[test]
fn zero_chunk_file_has_a_fixed_minimum_size() {
    let file = sample_wire_file(vec![]);
    let bytes = wire::write(&file).unwrap();
    assert_eq!(bytes.len(), CHUNKS_OFFSET + MERKLE_ROOT_BYTES + SIGNATURE_BYTES);
    let parsed = wire::parse(&bytes).unwrap();
    assert!(parsed.chunks.is_empty());
}

#[test]
fn header_fields_land_at_their_documented_offsets() {
    let file = sample_wire_file(vec![]);
    let bytes = wire::write(&file).unwrap();
    assert_eq!(&bytes[0..4], b"ZKIM");
    assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), VERSION);
    assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), FLAGS);
    assert_eq!(&bytes[KEM_CT_OFFSET..KEM_CT_OFFSET + KEM_CIPHERTEXT_BYTES], &file.kem_ciphertext[..]);
}

#[test]
fn rejects_wrong_magic() {
    let mut bytes = wire::write(&sample_wire_file(vec![])).unwrap();
    bytes[..4].copy_from_slice(b"INVA");
    let err = wire::parse(&bytes).unwrap_err();
    assert_eq!(err.error, zkim_core::ZkimError::InvalidMagic);
}

#[test]
fn rejects_wrong_version() {
    let mut bytes = wire::write(&sample_wire_file(vec![])).unwrap();
    bytes[4..6].copy_from_slice(&0x0002u16.to_le_bytes());
    let err = wire::parse(&bytes).unwrap_err();
    assert_eq!(err.error, zkim_core::ZkimError::InvalidVersion);
}

#[test]
fn rejects_wrong_flags() {
    let mut bytes = wire::write(&sample_wire_file(vec![])).unwrap();
    bytes[6..8].copy_from_slice(&0x0001u16.to_le_bytes());
    let err = wire::parse(&bytes).unwrap_err();
    assert_eq!(err.error, zkim_core::ZkimError::InvalidFlags);
}

#[test]
fn mutating_a_byte_before_the_merkle_root_breaks_the_recomputed_root() {
    let file = sample_wire_file(vec![WireChunk {
        nonce: [9u8; 24],
        ciphertext_with_tag: vec![0xAAu8; 64],
    }]);
    let mut bytes = wire::write(&file).unwrap();
    // flip a byte inside the chunk region, strictly before MERKLE_ROOT.
    let chunk_byte_offset = CHUNKS_OFFSET + 24 + 4 + 10;
    bytes[chunk_byte_offset] ^= 0x01;

    let parsed = wire::parse(&bytes).unwrap();
    let recomputed: Vec<_> = parsed
        .chunks
        .iter()
        .map(|c| zkim_core::merkle::chunk_integrity_hash(&c.nonce, &c.ciphertext_with_tag))
        .collect();
    let root = zkim_core::merkle::merkle_root(&recomputed);
    assert_ne!(root, parsed.merkle_root);
}
