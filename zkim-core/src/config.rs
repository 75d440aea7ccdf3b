//! Runtime configuration for the ZKIM file service.
//!
//! Named fields with an explicit `Default`, covering every core option.
//! Index-only options (`epoch_duration`, `max_queries_per_epoch`,
//! `bucket_sizes`, ...) live in `zkim_index::config::IndexConfig` instead,
//! since they have no meaning for a `FileService` running without
//! searchable encryption.

use crate::chunker::CompressionAlgorithm;

/// Tunables for a `FileService` instance.
///
/// All fields have defaults matching `spec.md`'s stated constants; callers
/// only need to override what differs for their deployment.
#[derive(Clone, Debug)]
pub struct ZkimConfig {
    /// Plaintext chunk size before compression/encryption, in bytes.
    /// Clamped to `[MIN_CHUNK_SIZE, MAX_CHUNK_SIZE]` by the chunker.
    pub chunk_size: usize,
    /// Maximum total file size accepted by `FileService::create`.
    pub max_file_size: u64,
    /// Enables compression before the content layer encrypts.
    pub enable_compression: bool,
    /// Which compressor `create` uses when `enable_compression` is set.
    pub compression_algorithm: CompressionAlgorithm,
    /// Compression effort/quality; clamped to each backend's own range.
    pub compression_level: u32,
    /// Whether `FileService::create` also builds searchable-index entries.
    pub enable_searchable_encryption: bool,
    /// Whether `decrypt` runs `validate_integrity` before opening the
    /// content layer and refuses to return plaintext from a file that
    /// fails it.
    pub enable_integrity_validation: bool,
    /// Reserved for a future chunked-streaming API; unused today.
    pub enable_streaming: bool,
    /// Bucket sizes chunk ciphertext lengths are rounded up to, to blur
    /// true chunk size on the wire (`spec.md` §3 Chunk invariant).
    pub chunk_padding_buckets: Vec<usize>,
}

impl Default for ZkimConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512 * 1024,
            max_file_size: 10 * 1024 * 1024 * 1024,
            enable_compression: true,
            compression_algorithm: CompressionAlgorithm::Gzip,
            compression_level: 6,
            enable_searchable_encryption: false,
            enable_integrity_validation: true,
            enable_streaming: false,
            chunk_padding_buckets: vec![32, 64, 128, 256, 512, 1024],
        }
    }
}
