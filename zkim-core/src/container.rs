//! In-memory container: the result of `create`/`parse`, before or after
//! decryption.

use crate::metadata::Metadata;
use crate::wire::WireFile;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub String);

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully materialized container: the parsed wire format plus the
/// metadata needed to decrypt and validate it. Lives only in memory;
/// the wire format is the on-disk/on-wire representation.
pub struct Container {
    pub file_id: FileId,
    pub object_id: ObjectId,
    pub wire: WireFile,
    pub metadata: Metadata,
}

pub struct ValidationReport {
    pub is_valid: bool,
    pub level: ValidationLevel,
    pub header_valid: bool,
    pub chunks_valid: bool,
    pub signatures_valid: bool,
    pub metadata_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub elapsed: std::time::Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    None,
    Basic,
    Full,
}

pub struct FileResult {
    pub container: Container,
    pub object_id: ObjectId,
    pub original_size: usize,
    pub compressed_size: usize,
    pub encrypted_size: usize,
    pub elapsed: std::time::Duration,
    pub warnings: Vec<String>,
}
