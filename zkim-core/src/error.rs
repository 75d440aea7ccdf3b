//! Unified error type for the ZKIM container pipeline.
//!
//! Every failure mode named by the format's error taxonomy is a concrete
//! variant here. Cryptographic and structural failures never retry; storage
//! failures are the caller's decision (see `ZkimError::StorageUnavailable`).

use std::collections::BTreeMap;
use std::fmt;

pub type Details = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZkimError {
    // --- Structural / fatal-at-call-site, never retried ---
    FileTooLarge,
    FileTooSmall,
    InvalidKeyLength,
    InvalidNonceLength,
    InvalidTagLength,
    InvalidMagic,
    InvalidVersion,
    InvalidFlags,
    InvalidEhLength,
    InvalidKemCiphertextLength,
    InvalidSignatureLength,
    InvalidMerkleRootLength,
    InvalidChunkNonceLength,
    ChunkDataTooShort,
    InvalidFileStructure,
    UnsupportedCompression,

    // --- Tamper / misuse, fatal ---
    AuthenticationFailed,
    IntegrityFailed,
    AccessDenied,
    MissingDecryptionData,
    MissingContentNonce,

    // --- Storage ---
    StorageUnavailable,

    // --- Search / index ---
    OprfNotInitialized,
    RateLimitExceeded,
    TrapdoorRevoked,

    // --- Defensive catch-all ---
    Internal,
}

impl ZkimError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::FileTooSmall => "FILE_TOO_SMALL",
            Self::InvalidKeyLength => "INVALID_KEY_LENGTH",
            Self::InvalidNonceLength => "INVALID_NONCE_LENGTH",
            Self::InvalidTagLength => "INVALID_TAG_LENGTH",
            Self::InvalidMagic => "INVALID_MAGIC",
            Self::InvalidVersion => "INVALID_VERSION",
            Self::InvalidFlags => "INVALID_FLAGS",
            Self::InvalidEhLength => "INVALID_EH_LENGTH",
            Self::InvalidKemCiphertextLength => "INVALID_KEM_CIPHERTEXT_LENGTH",
            Self::InvalidSignatureLength => "INVALID_SIGNATURE_LENGTH",
            Self::InvalidMerkleRootLength => "INVALID_MERKLE_ROOT_LENGTH",
            Self::InvalidChunkNonceLength => "INVALID_CHUNK_NONCE_LENGTH",
            Self::ChunkDataTooShort => "CHUNK_DATA_TOO_SHORT",
            Self::InvalidFileStructure => "INVALID_FILE_STRUCTURE",
            Self::UnsupportedCompression => "UNSUPPORTED_COMPRESSION",
            Self::AuthenticationFailed => "AUTHENTICATION_FAILED",
            Self::IntegrityFailed => "INTEGRITY_FAILED",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::MissingDecryptionData => "MISSING_DECRYPTION_DATA",
            Self::MissingContentNonce => "MISSING_CONTENT_NONCE",
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
            Self::OprfNotInitialized => "OPRF_NOT_INITIALIZED",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::TrapdoorRevoked => "TRAPDOOR_REVOKED",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ZkimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::error::Error for ZkimError {}

/// A `ZkimError` plus the details map every public operation surfaces.
///
/// `spec.md` §7 requires "a single typed error with `code`, `message`, and
/// `details`" on every public operation's failure path. `code`/`message`
/// come from `ZkimError`'s `Display`/`code()`; `details` is attached here
/// so call sites can add context (e.g. which user_id was denied access)
/// without growing the enum.
#[derive(Debug, Clone)]
pub struct ZkimFailure {
    pub error: ZkimError,
    pub details: Details,
}

impl ZkimFailure {
    pub fn new(error: ZkimError) -> Self {
        Self {
            error,
            details: Details::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn code(&self) -> &'static str {
        self.error.code()
    }
}

impl fmt::Display for ZkimFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if !self.details.is_empty() {
            write!(f, " (")?;
            for (i, (k, v)) in self.details.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k}={v}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for ZkimFailure {}

impl From<ZkimError> for ZkimFailure {
    fn from(error: ZkimError) -> Self {
        Self::new(error)
    }
}

pub type ZkimResult<T> = Result<T, ZkimFailure>;
