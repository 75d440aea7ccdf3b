//! Core primitives and orchestration for the ZKIM secure container format.
//!
//! Layout mirrors the container's own layering: [`crypto`] wraps every
//! third-party primitive behind a narrow byte-oriented API, [`keys`] and
//! [`encryptor`] build the three-layer envelope on top of it, [`chunker`]
//! and [`wire`] handle the on-disk representation, [`merkle`] and
//! [`container`] tie integrity and identity together, and [`service`]
//! exposes the whole thing as six public operations a caller actually
//! uses. `zkim-index` depends on this crate for [`crypto::oprf`] and
//! implements [`service::SearchBackend`] against it; this crate never
//! depends back on `zkim-index`.

pub mod bucket;
pub mod chunker;
pub mod config;
pub mod container;
pub mod crypto;
pub mod encryptor;
pub mod error;
pub mod keys;
pub mod merkle;
pub mod metadata;
pub mod service;
pub mod storage;
pub mod wire;

pub use config::ZkimConfig;
pub use container::{Container, FileId, FileResult, ObjectId, ValidationLevel, ValidationReport};
pub use error::{ZkimError, ZkimFailure, ZkimResult};
pub use metadata::{AccessControl, Metadata, PlatformMetadata, RetentionPolicy, UserMetadata};
pub use service::{FileService, SearchBackend, SearchResult};
pub use storage::StorageBackend;
