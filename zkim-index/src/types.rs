//! Data model for the searchable index (`spec.md` §3 "Indexed File Entry",
//! "Trapdoor").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TokenBytes = [u8; 32];

/// A file's search-side record. Carries only OPRF tokens, never plaintext
/// keywords — `tokens` is the only place a keyword's shape survives
/// indexing, and it is irreversible without the OPRF secret.
///
/// `Serialize`/`Deserialize` back `SearchableIndex`'s autosave snapshot
/// (`spec.md` §5's suppressible "auto-save timer"), not a wire format of
/// its own — nothing here is exposed on the container's bit-exact layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedFile {
    pub file_id: String,
    pub object_id: String,
    pub user_id: String,
    pub file_name: String,
    pub tags: Vec<String>,
    pub custom_fields: Vec<(String, String)>,
    pub read_access: Vec<String>,
    pub tokens: Vec<TokenBytes>,
    pub indexed_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub access_count: u64,
    pub privacy_level: PrivacyLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivacyLevel {
    Standard,
    Enhanced,
}

/// A query-time OPRF output used to locate matching stored tokens.
/// `spec.md` §3: "a revoked or expired trapdoor must not produce matches."
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trapdoor {
    pub trapdoor_id: String,
    pub user_id: String,
    pub query_text: String,
    pub epoch: u64,
    pub expires_at: DateTime<Utc>,
    pub usage_count: u64,
    pub max_usage: u64,
    pub revoked: bool,
}

impl Trapdoor {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at && self.usage_count < self.max_usage
    }
}

#[derive(Debug, Clone)]
pub struct QueryHistoryEntry {
    pub query_id: String,
    pub user_id: String,
    pub query_text: String,
    pub epoch: u64,
    pub result_count: usize,
    pub executed_at: DateTime<Utc>,
}

/// One scored hit before padding/shuffling. Mirrors
/// `zkim_core::service::SearchResult`, plus the `access_level` tag padded
/// synthetic entries need to distinguish themselves from real hits.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub file_id: String,
    pub object_id: String,
    pub relevance: f64,
    pub access_level: String,
}
