//! Privacy-preserving searchable index for ZKIM containers.
//!
//! [`SearchableIndex`] implements
//! [`zkim_core::service::SearchBackend`], so a `FileService` wired with
//! `with_search_backend` calls into this crate without `zkim-core` ever
//! depending back on it.
//!
//! OPRF evaluation lives in `zkim_core::crypto::oprf`; this crate owns the
//! index's data model ([`types`]), audit trail ([`audit`]), trapdoor
//! lifecycle ([`trapdoor`]), and the orchestrating [`SearchableIndex`]
//! itself ([`index`]).

pub mod audit;
pub mod config;
pub mod index;
pub mod trapdoor;
pub mod types;

pub use audit::{IndexAuditEntry, IndexAuditSink, IndexEvent, InMemoryAuditSink, TracingAuditSink};
pub use config::IndexConfig;
pub use index::SearchableIndex;
pub use trapdoor::{RotationSummary, TrapdoorPolicy};
pub use types::{IndexedFile, PrivacyLevel, QueryHistoryEntry, Trapdoor};
