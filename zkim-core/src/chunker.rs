//! Chunker & compressor: `spec.md` §4.3.
//!
//! Compresses the whole plaintext (optional), then slices the result into
//! fixed-size chunks for the three-layer encryptor to seal independently
//! on the wire.

use flate2::write::GzEncoder;
use flate2::read::GzDecoder;
use flate2::Compression as GzCompression;
use std::io::{Read, Write};

use crate::error::{ZkimError, ZkimFailure, ZkimResult};

pub const MIN_CHUNK_SIZE: usize = 1024;
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024 * 1024;
pub const DEFAULT_CHUNK_SIZE: usize = 512 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    None,
    Brotli,
    Gzip,
}

impl CompressionAlgorithm {
    pub fn type_code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Brotli => 1,
            Self::Gzip => 2,
        }
    }

    pub fn from_type_code(code: u8) -> ZkimResult<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Brotli),
            2 => Ok(Self::Gzip),
            _ => Err(ZkimFailure::new(ZkimError::UnsupportedCompression)
                .with_detail("code", code.to_string())),
        }
    }
}

pub struct ProcessOutcome {
    pub payload: Vec<u8>,
    pub chunks: Vec<Vec<u8>>,
    pub compression: CompressionAlgorithm,
    pub original_len: usize,
    pub compressed_len: usize,
    /// Set when compression was requested but failed and the pipeline fell
    /// back to storing the plaintext uncompressed.
    pub compression_fallback: bool,
}

pub fn process(
    plaintext: &[u8],
    enable_compression: bool,
    algorithm: CompressionAlgorithm,
    level: u32,
    chunk_size: usize,
) -> ZkimResult<ProcessOutcome> {
    check_file_size(plaintext.len() as u64)?;
    let chunk_size = chunk_size.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE);

    let (payload, used_algorithm, fallback) = if enable_compression && algorithm != CompressionAlgorithm::None {
        match compress(plaintext, algorithm, level) {
            Ok(compressed) => (compressed, algorithm, false),
            Err(_) => {
                tracing::warn!(
                    requested = ?algorithm,
                    "compression failed, falling back to uncompressed storage"
                );
                (plaintext.to_vec(), CompressionAlgorithm::None, true)
            }
        }
    } else {
        (plaintext.to_vec(), CompressionAlgorithm::None, false)
    };

    let chunks = payload
        .chunks(chunk_size)
        .map(|c| c.to_vec())
        .collect::<Vec<_>>();

    Ok(ProcessOutcome {
        compressed_len: payload.len(),
        original_len: plaintext.len(),
        payload,
        chunks,
        compression: used_algorithm,
        compression_fallback: fallback,
    })
}

fn check_file_size(len: u64) -> ZkimResult<()> {
    if len > MAX_FILE_SIZE {
        return Err(ZkimFailure::new(ZkimError::FileTooLarge)
            .with_detail("max_bytes", MAX_FILE_SIZE.to_string())
            .with_detail("actual_bytes", len.to_string()));
    }
    Ok(())
}

pub fn decompress(data: &[u8], algorithm: CompressionAlgorithm) -> ZkimResult<Vec<u8>> {
    match algorithm {
        CompressionAlgorithm::None => Ok(data.to_vec()),
        CompressionAlgorithm::Gzip => {
            let mut decoder = GzDecoder::new(data);
            let mut out = Vec::new();
            decoder
                .read_to_end(&mut out)
                .map_err(|_| ZkimFailure::new(ZkimError::InvalidFileStructure))?;
            Ok(out)
        }
        CompressionAlgorithm::Brotli => {
            let mut out = Vec::new();
            let mut reader = brotli::Decompressor::new(data, 4096);
            reader
                .read_to_end(&mut out)
                .map_err(|_| ZkimFailure::new(ZkimError::InvalidFileStructure))?;
            Ok(out)
        }
    }
}

fn compress(data: &[u8], algorithm: CompressionAlgorithm, level: u32) -> std::io::Result<Vec<u8>> {
    match algorithm {
        CompressionAlgorithm::None => Ok(data.to_vec()),
        CompressionAlgorithm::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), GzCompression::new(level.min(9)));
            encoder.write_all(data)?;
            encoder.finish()
        }
        CompressionAlgorithm::Brotli => {
            let mut out = Vec::new();
            let params = brotli::enc::BrotliEncoderParams {
                quality: level.min(11) as i32,
                ..Default::default()
            };
            brotli::BrotliCompress(&mut &data[..], &mut out, &params)?;
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gzip_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(50);
        let outcome = process(&data, true, CompressionAlgorithm::Gzip, 6, 1024).unwrap();
        assert_eq!(outcome.compression, CompressionAlgorithm::Gzip);
        let restored = decompress(&outcome.payload, outcome.compression).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn brotli_round_trips() {
        let data = b"zkim container payload".repeat(100);
        let outcome = process(&data, true, CompressionAlgorithm::Brotli, 5, 2048).unwrap();
        let restored = decompress(&outcome.payload, outcome.compression).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn disabled_compression_passes_through() {
        let data = b"raw bytes".to_vec();
        let outcome = process(&data, false, CompressionAlgorithm::Gzip, 6, 1024).unwrap();
        assert_eq!(outcome.compression, CompressionAlgorithm::None);
        assert_eq!(outcome.payload, data);
    }

    #[test]
    fn chunk_size_is_clamped() {
        let data = vec![0u8; 4096];
        let outcome = process(&data, false, CompressionAlgorithm::None, 0, 16).unwrap();
        assert!(outcome.chunks.iter().all(|c| c.len() <= MIN_CHUNK_SIZE));
    }

    #[test]
    fn empty_payload_is_accepted() {
        let outcome = process(&[0u8; 0], true, CompressionAlgorithm::None, 0, 1024).unwrap();
        assert_eq!(outcome.original_len, 0);
    }

    #[test]
    fn file_at_max_size_is_accepted() {
        assert!(check_file_size(MAX_FILE_SIZE).is_ok());
    }

    #[test]
    fn file_over_max_size_is_rejected() {
        // Exercise the boundary through a length, not a real >10GiB buffer.
        let err = check_file_size(MAX_FILE_SIZE + 1).unwrap_err();
        assert_eq!(err.error, ZkimError::FileTooLarge);
    }
}
