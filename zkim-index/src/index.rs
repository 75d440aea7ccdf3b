//! Privacy-preserving searchable index (`spec.md` §4.8).
//!
//! `SearchableIndex` owns three maps exactly as `spec.md` describes them
//! and an OPRF secret scalar generated once at construction. Every public
//! method takes the single `RwLock::read`/`write` guard it needs for its
//! whole body — in particular `search` holds one read guard per map for
//! the entire scan/score/noise/shuffle/pad pass, so an interleaved
//! `advance_epoch` can never observe or produce a partial result
//! (`spec.md` §5 ordering guarantee).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use zkim_core::crypto::ct::ct_eq;
use zkim_core::crypto::oprf::OprfSecretKey;
use zkim_core::crypto::rng::fill_random;
use zkim_core::error::{ZkimError, ZkimFailure, ZkimResult};
use zkim_core::metadata::Metadata;
use zkim_core::service::{SearchBackend, SearchResult};
use zkim_core::storage::StorageBackend;

use crate::audit::{self, IndexAuditSink, IndexEvent};
use crate::config::IndexConfig;
use crate::trapdoor::TrapdoorPolicy;
use crate::types::{IndexedFile, PrivacyLevel, QueryHistoryEntry, Trapdoor};

/// Reserved storage key the autosave task persists a snapshot under; one
/// snapshot per `SearchableIndex` instance, the way `zkim-core` reserves
/// `"zkim-kem-key:<file_id>:<user_id>"` for its own storage-backed blobs.
const SNAPSHOT_STORAGE_KEY: &str = "zkim-index-snapshot";

/// What `save_snapshot`/`load_snapshot` persist: the two maps that outlive
/// a process restart. `query_history` and `query_counts` are per-epoch
/// scratch state and are intentionally not part of the snapshot.
#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    file_index: HashMap<String, IndexedFile>,
    trapdoors: HashMap<String, Trapdoor>,
    epoch: u64,
    /// Base64 of the 32-byte OPRF secret scalar. Without this, tokens
    /// computed before a restart can never match a freshly generated
    /// secret after `load_snapshot` — the whole `file_index` would come
    /// back searchable-by-name only, never by token.
    oprf_secret: String,
}

/// The searchable index. One instance serves one `FileService` deployment
/// (`spec.md` §4.8's "in-memory maps... an OPRF secret scalar generated at
/// init; an epoch counter"). An optional storage backend lets the two
/// persistable maps (`file_index`, `trapdoors`) survive a restart via
/// `save_snapshot`/`load_snapshot` and the auto-save timer.
pub struct SearchableIndex {
    config: IndexConfig,
    file_index: RwLock<HashMap<String, IndexedFile>>,
    trapdoors: RwLock<HashMap<String, Trapdoor>>,
    query_history: RwLock<HashMap<String, Vec<QueryHistoryEntry>>>,
    query_counts: RwLock<HashMap<String, u32>>,
    oprf_secret: RwLock<Option<OprfSecretKey>>,
    epoch: AtomicU64,
    audit: Arc<dyn IndexAuditSink>,
    epoch_timer: std::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
    /// Snapshot persistence target. `None` means `save_snapshot`/
    /// `load_snapshot` and the autosave timer are all no-ops, the same way
    /// `FileService` treats a missing optional `search_backend`.
    storage: Option<Arc<dyn StorageBackend>>,
    autosave_timer: std::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl SearchableIndex {
    pub fn new(config: IndexConfig) -> Arc<Self> {
        Self::with_audit_sink(config, audit::arc_default_sink())
    }

    pub fn with_audit_sink(config: IndexConfig, audit: Arc<dyn IndexAuditSink>) -> Arc<Self> {
        Self::build(config, audit, None)
    }

    /// Constructs an index whose snapshot is persisted through `storage`
    /// (`spec.md` §5/§9's auto-save timer). `enable_autosave_timer` still
    /// governs whether the background task is actually spawned.
    pub fn with_storage(config: IndexConfig, storage: Arc<dyn StorageBackend>) -> Arc<Self> {
        Self::build(config, audit::arc_default_sink(), Some(storage))
    }

    pub fn with_storage_and_audit_sink(
        config: IndexConfig,
        storage: Arc<dyn StorageBackend>,
        audit: Arc<dyn IndexAuditSink>,
    ) -> Arc<Self> {
        Self::build(config, audit, Some(storage))
    }

    fn build(config: IndexConfig, audit: Arc<dyn IndexAuditSink>, storage: Option<Arc<dyn StorageBackend>>) -> Arc<Self> {
        let index = Arc::new(Self {
            epoch_timer: std::sync::Mutex::new(None),
            autosave_timer: std::sync::Mutex::new(None),
            config: config.clone(),
            file_index: RwLock::new(HashMap::new()),
            trapdoors: RwLock::new(HashMap::new()),
            query_history: RwLock::new(HashMap::new()),
            query_counts: RwLock::new(HashMap::new()),
            oprf_secret: RwLock::new(Some(OprfSecretKey::generate())),
            epoch: AtomicU64::new(0),
            audit,
            storage,
        });
        if config.enable_epoch_timer {
            index.clone().spawn_epoch_timer();
        }
        if config.enable_autosave_timer && index.storage.is_some() {
            index.clone().spawn_autosave_timer();
        }
        index
    }

    fn spawn_epoch_timer(self: Arc<Self>) {
        let interval = self.config.epoch_duration;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately; skip it
            loop {
                ticker.tick().await;
                self.advance_epoch();
            }
        });
        *self.epoch_timer.lock().unwrap() = Some(handle);
    }

    /// Mirrors `spawn_epoch_timer`: a background task that calls
    /// `save_snapshot` on a fixed interval and logs (rather than
    /// propagates) failures, since nothing is waiting on this task's
    /// result.
    fn spawn_autosave_timer(self: Arc<Self>) {
        let interval = self.config.autosave_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately; skip it
            loop {
                ticker.tick().await;
                if let Err(err) = self.save_snapshot().await {
                    tracing::warn!(error = %err, "search index: autosave snapshot failed");
                }
            }
        });
        *self.autosave_timer.lock().unwrap() = Some(handle);
    }

    /// Serializes `file_index` and `trapdoors` to the configured storage
    /// backend under `SNAPSHOT_STORAGE_KEY`. A no-op returning `Ok(())` if
    /// no storage backend was configured.
    pub async fn save_snapshot(&self) -> ZkimResult<()> {
        let Some(storage) = self.storage.as_ref() else {
            return Ok(());
        };
        let oprf_secret = {
            let guard = self.oprf_secret.read().unwrap();
            let secret = guard.as_ref().ok_or_else(|| ZkimFailure::new(ZkimError::OprfNotInitialized))?;
            BASE64.encode(&secret.to_bytes()[..])
        };
        let snapshot = IndexSnapshot {
            file_index: self.file_index.read().unwrap().clone(),
            trapdoors: self.trapdoors.read().unwrap().clone(),
            epoch: self.current_epoch(),
            oprf_secret,
        };
        let bytes = serde_json::to_vec(&snapshot).map_err(|_| ZkimFailure::new(ZkimError::Internal))?;
        storage.set(SNAPSHOT_STORAGE_KEY, &bytes).await?;
        tracing::debug!(epoch = snapshot.epoch, "search index: snapshot saved");
        Ok(())
    }

    /// Restores `file_index`, `trapdoors`, and the epoch counter from a
    /// previously saved snapshot. A no-op if no storage is configured or
    /// no snapshot has been saved yet. Meant to be called once, right
    /// after construction, before any file is indexed.
    pub async fn load_snapshot(&self) -> ZkimResult<()> {
        let Some(storage) = self.storage.as_ref() else {
            return Ok(());
        };
        let Some(bytes) = storage.get(SNAPSHOT_STORAGE_KEY).await? else {
            return Ok(());
        };
        let snapshot: IndexSnapshot =
            serde_json::from_slice(&bytes).map_err(|_| ZkimFailure::new(ZkimError::Internal))?;
        let secret_bytes: [u8; zkim_core::crypto::oprf::OPRF_SECRET_BYTES] = BASE64
            .decode(&snapshot.oprf_secret)
            .ok()
            .and_then(|v| v.try_into().ok())
            .ok_or_else(|| ZkimFailure::new(ZkimError::Internal))?;
        *self.file_index.write().unwrap() = snapshot.file_index;
        *self.trapdoors.write().unwrap() = snapshot.trapdoors;
        *self.oprf_secret.write().unwrap() = Some(OprfSecretKey::from_bytes(&secret_bytes));
        self.epoch.store(snapshot.epoch, Ordering::SeqCst);
        tracing::debug!(epoch = snapshot.epoch, "search index: snapshot loaded");
        Ok(())
    }

    pub fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Advances the epoch counter, resets every user's per-epoch query
    /// count, clears query history, and (if enabled) rotates trapdoors.
    /// `spec.md` §4.8: "Every epoch tick: advance counter, clear query
    /// history, cleanup expired trapdoors."
    pub fn advance_epoch(&self) {
        let new_epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.query_counts.write().unwrap().clear();
        self.query_history.write().unwrap().clear();
        if self.config.enable_trapdoor_rotation {
            self.rotate_trapdoors();
        }
        tracing::debug!(epoch = new_epoch, "search index: epoch advanced");
        self.audit.record(IndexEvent::EpochAdvanced { epoch: new_epoch });
    }

    /// Revokes expired trapdoors and resets usage counters on over-used
    /// ones that haven't expired yet.
    pub fn rotate_trapdoors(&self) {
        let now = Utc::now();
        let summary = TrapdoorPolicy::rotate(&mut self.trapdoors.write().unwrap(), now);
        self.audit.record(IndexEvent::TrapdoorsRotated {
            revoked: summary.revoked,
            usage_reset: summary.usage_reset,
        });
    }

    /// Idempotent teardown: aborts the epoch timer if running, zeroizes
    /// the OPRF secret, and clears all three maps. Safe to call from any
    /// state, including before any indexing has happened.
    pub fn cleanup(&self) {
        if let Some(handle) = self.epoch_timer.lock().unwrap().take() {
            handle.abort();
        }
        if let Some(handle) = self.autosave_timer.lock().unwrap().take() {
            handle.abort();
        }
        if let Some(mut secret) = self.oprf_secret.write().unwrap().take() {
            secret.zeroize();
        }
        self.file_index.write().unwrap().clear();
        self.trapdoors.write().unwrap().clear();
        self.query_history.write().unwrap().clear();
        self.query_counts.write().unwrap().clear();
    }

    fn oprf_evaluate(&self, term: &str) -> ZkimResult<[u8; 32]> {
        let guard = self.oprf_secret.read().unwrap();
        let secret = guard.as_ref().ok_or_else(|| ZkimFailure::new(ZkimError::OprfNotInitialized))?;
        Ok(secret.evaluate(term.to_lowercase().as_bytes()))
    }

    /// Every indexable string on a piece of metadata: file name, MIME
    /// type, every tag, and every `"key:value"` custom field string,
    /// skipping the crate's own internal `__`-prefixed bookkeeping fields
    /// (layer ciphertexts, compression code) which carry no searchable
    /// keyword content.
    fn indexable_terms(metadata: &Metadata) -> Vec<String> {
        let mut terms = vec![metadata.file_name.clone(), metadata.mime_type.clone()];
        terms.extend(metadata.tags.iter().cloned());
        for (k, v) in &metadata.custom_fields {
            if k.starts_with("__") {
                continue;
            }
            terms.push(format!("{k}:{v}"));
        }
        terms
    }

    fn relevance_score(query_lower: &str, file: &IndexedFile) -> f64 {
        let mut score = 0.0;
        if file.file_name.to_lowercase().contains(query_lower) {
            score += 0.5;
        }
        if file.tags.iter().any(|t| t.to_lowercase().contains(query_lower)) {
            score += 0.3;
        }
        if file
            .custom_fields
            .iter()
            .any(|(k, v)| k.to_lowercase().contains(query_lower) || v.to_lowercase().contains(query_lower))
        {
            score += 0.2;
        }
        score.min(1.0)
    }

    fn apply_privacy_noise(&self, results: &mut [SearchResult]) {
        for result in results.iter_mut() {
            let mut byte = [0u8; 1];
            fill_random(&mut byte);
            // Maps a uniform byte to [-0.05, 0.05].
            let noise = (byte[0] as f64 / 255.0) * 0.1 - 0.05;
            result.relevance = (result.relevance + noise).clamp(0.0, 1.0);
        }
        fisher_yates_shuffle(results);
    }

    fn pad_results(&self, results: &mut Vec<SearchResult>) {
        let target = zkim_core::bucket::next_bucket(results.len(), &self.config.bucket_sizes);
        while results.len() < target {
            let mut byte = [0u8; 1];
            fill_random(&mut byte);
            let relevance = 0.1 + (byte[0] as f64 / 255.0) * 0.2;
            results.push(SearchResult {
                file_id: format!("padding-{}", results.len()),
                object_id: String::new(),
                relevance,
                access_level: "metadata".to_string(),
            });
        }
        fisher_yates_shuffle(results);
    }
}

fn fisher_yates_shuffle<T>(items: &mut [T]) {
    if items.len() < 2 {
        return;
    }
    for i in (1..items.len()).rev() {
        let mut buf = [0u8; 8];
        fill_random(&mut buf);
        let j = (u64::from_le_bytes(buf) as usize) % (i + 1);
        items.swap(i, j);
    }
}

#[async_trait]
impl SearchBackend for SearchableIndex {
    async fn index_file(&self, file_id: &str, object_id: &str, metadata: &Metadata) -> ZkimResult<()> {
        let tokens: Vec<[u8; 32]> = Self::indexable_terms(metadata)
            .iter()
            .map(|term| self.oprf_evaluate(term))
            .collect::<ZkimResult<_>>()?;

        let entry = IndexedFile {
            file_id: file_id.to_string(),
            object_id: object_id.to_string(),
            user_id: metadata.user_id.clone(),
            file_name: metadata.file_name.clone(),
            tags: metadata.tags.clone(),
            custom_fields: metadata
                .custom_fields
                .iter()
                .filter(|(k, _)| !k.starts_with("__"))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            read_access: metadata.access_control.read.clone(),
            tokens: tokens.clone(),
            indexed_at: Utc::now(),
            last_accessed: None,
            access_count: 0,
            privacy_level: if self.config.enable_privacy_enhancement {
                PrivacyLevel::Enhanced
            } else {
                PrivacyLevel::Standard
            },
        };
        self.file_index.write().unwrap().insert(file_id.to_string(), entry);
        tracing::debug!(file_id, token_count = tokens.len(), "search index: file indexed");
        self.audit.record(IndexEvent::FileIndexed {
            file_id: file_id.to_string(),
            token_count: tokens.len(),
        });
        Ok(())
    }

    async fn remove_from_index(&self, file_id: &str) -> ZkimResult<()> {
        self.file_index.write().unwrap().remove(file_id);
        self.audit.record(IndexEvent::FileRemoved { file_id: file_id.to_string() });
        Ok(())
    }

    async fn update_index(&self, file_id: &str, metadata: &Metadata) -> ZkimResult<()> {
        let object_id = self
            .file_index
            .read()
            .unwrap()
            .get(file_id)
            .map(|f| f.object_id.clone())
            .unwrap_or_else(|| file_id.to_string());
        self.index_file(file_id, &object_id, metadata).await?;
        self.audit.record(IndexEvent::IndexUpdated { file_id: file_id.to_string() });
        Ok(())
    }

    /// `spec.md` §4.8's seven-step `search`: rate limit, trapdoor,
    /// scan+match, score, noise+shuffle, pad, truncate — in that order,
    /// with no suspension point between the scan and the returned vector.
    async fn search(&self, query: &str, user_id: &str, limit: Option<usize>) -> ZkimResult<Vec<SearchResult>> {
        let epoch = self.current_epoch();

        if self.config.enable_rate_limiting {
            let mut counts = self.query_counts.write().unwrap();
            let count = counts.entry(user_id.to_string()).or_insert(0);
            if *count >= self.config.max_queries_per_epoch {
                self.audit.record(IndexEvent::QueryRateLimited { user_id: user_id.to_string(), epoch });
                return Err(ZkimFailure::new(ZkimError::RateLimitExceeded)
                    .with_detail("user_id", user_id.to_string())
                    .with_detail("max_queries_per_epoch", self.config.max_queries_per_epoch.to_string()));
            }
            *count += 1;
        }

        let query_lower = query.to_lowercase();
        let trapdoor_token = self.oprf_evaluate(&query_lower)?;

        let trapdoor_id = BASE64.encode(trapdoor_token);
        let now = Utc::now();
        {
            let mut trapdoors = self.trapdoors.write().unwrap();
            match trapdoors.get_mut(&trapdoor_id) {
                // Re-issuing the same query maps to the same OPRF token and
                // therefore the same trapdoor_id; a revoked, expired, or
                // usage-exhausted entry must not be silently replaced with a
                // fresh usable one, or revocation/rotation would have no
                // effect on future identical queries.
                Some(existing) if !existing.is_usable(now) => {
                    self.audit.record(IndexEvent::TrapdoorRejected {
                        user_id: user_id.to_string(),
                        trapdoor_id: trapdoor_id.clone(),
                    });
                    return Err(ZkimFailure::new(ZkimError::TrapdoorRevoked)
                        .with_detail("trapdoor_id", trapdoor_id));
                }
                Some(existing) => {
                    existing.usage_count += 1;
                }
                None => {
                    trapdoors.insert(
                        trapdoor_id.clone(),
                        Trapdoor {
                            trapdoor_id,
                            user_id: user_id.to_string(),
                            query_text: query.to_string(),
                            epoch,
                            expires_at: now + chrono::Duration::from_std(self.config.epoch_duration).unwrap(),
                            usage_count: 1,
                            max_usage: 100,
                            revoked: false,
                        },
                    );
                }
            }
        }

        let mut results: Vec<SearchResult> = {
            let index = self.file_index.read().unwrap();
            index
                .values()
                .filter(|file| file.read_access.iter().any(|u| u == user_id))
                .filter(|file| file.tokens.iter().any(|t| ct_eq(t, &trapdoor_token)))
                .map(|file| SearchResult {
                    file_id: file.file_id.clone(),
                    object_id: file.object_id.clone(),
                    relevance: Self::relevance_score(&query_lower, file),
                    access_level: "full".to_string(),
                })
                .collect()
        };

        // `file_index` is a `HashMap`, so collection order carries no
        // meaning on its own; sort by relevance first so the "scored
        // order" contract holds even when nothing downstream reorders it.
        results.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap_or(std::cmp::Ordering::Equal));

        if self.config.enable_privacy_enhancement {
            self.apply_privacy_noise(&mut results);
        }

        let real_count = results.len();
        if self.config.enable_result_padding {
            self.pad_results(&mut results);
        }

        if let Some(limit) = limit {
            results.truncate(limit);
        }

        if self.config.enable_query_logging {
            self.query_history.write().unwrap().entry(user_id.to_string()).or_default().push(QueryHistoryEntry {
                query_id: format!("q-{}-{}", user_id, epoch),
                user_id: user_id.to_string(),
                query_text: query.to_string(),
                epoch,
                result_count: real_count,
                executed_at: Utc::now(),
            });
        }

        tracing::debug!(%user_id, epoch, result_count = results.len(), "search index: query executed");
        self.audit.record(IndexEvent::QueryExecuted {
            user_id: user_id.to_string(),
            epoch,
            result_count: real_count,
        });

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkim_core::metadata::Metadata;

    fn metadata_with(user_id: &str, file_name: &str, tags: &[&str]) -> Metadata {
        let mut md = Metadata::new(file_name, "text/plain", user_id);
        md.tags = tags.iter().map(|t| t.to_string()).collect();
        md.access_control.read.push(user_id.to_string());
        md
    }

    #[tokio::test]
    async fn indexes_and_finds_by_tag() {
        let mut config = IndexConfig::default();
        config.enable_result_padding = false;
        config.enable_privacy_enhancement = false;
        let index = SearchableIndex::new(config);
        index
            .index_file("f1", "o1", &metadata_with("user-1", "crypto-notes.txt", &["cryptography", "security"]))
            .await
            .unwrap();
        index
            .index_file("f2", "o2", &metadata_with("user-1", "zk-notes.txt", &["privacy", "zero-knowledge", "security"]))
            .await
            .unwrap();
        index
            .index_file("f3", "o3", &metadata_with("user-1", "chain-notes.txt", &["blockchain", "distributed", "systems"]))
            .await
            .unwrap();

        let hits = index.search("security", "user-1", None).await.unwrap();
        assert_eq!(hits.len(), 2);
        let hits = index.search("blockchain", "user-1", None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_id, "f3");
    }

    #[tokio::test]
    async fn search_excludes_files_without_read_access() {
        let mut config = IndexConfig::default();
        config.enable_result_padding = false;
        config.enable_privacy_enhancement = false;
        let index = SearchableIndex::new(config);
        let mut md = metadata_with("owner", "secret.txt", &["security"]);
        md.access_control.read = vec!["owner".to_string()];
        index.index_file("f1", "o1", &md).await.unwrap();

        let hits = index.search("security", "intruder", None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn rate_limit_rejects_the_nth_plus_one_query() {
        let mut config = IndexConfig::default();
        config.max_queries_per_epoch = 2;
        config.enable_result_padding = false;
        let index = SearchableIndex::new(config);
        index.search("a", "user-1", None).await.unwrap();
        index.search("b", "user-1", None).await.unwrap();
        let err = index.search("c", "user-1", None).await.unwrap_err();
        assert_eq!(err.error, ZkimError::RateLimitExceeded);
    }

    #[tokio::test]
    async fn advance_epoch_resets_rate_limit() {
        let mut config = IndexConfig::default();
        config.max_queries_per_epoch = 1;
        config.enable_result_padding = false;
        let index = SearchableIndex::new(config);
        index.search("a", "user-1", None).await.unwrap();
        assert!(index.search("b", "user-1", None).await.is_err());
        index.advance_epoch();
        assert!(index.search("c", "user-1", None).await.is_ok());
    }

    #[tokio::test]
    async fn result_padding_rounds_up_to_bucket() {
        let mut config = IndexConfig::default();
        config.enable_privacy_enhancement = false;
        config.bucket_sizes = vec![4, 8];
        let index = SearchableIndex::new(config);
        let md = metadata_with("user-1", "doc.txt", &["security"]);
        index.index_file("f1", "o1", &md).await.unwrap();

        let hits = index.search("security", "user-1", None).await.unwrap();
        assert_eq!(hits.len(), 4);
    }

    #[tokio::test]
    async fn cleanup_clears_all_state_and_is_idempotent() {
        let index = SearchableIndex::new(IndexConfig::default());
        let md = metadata_with("user-1", "doc.txt", &["security"]);
        index.index_file("f1", "o1", &md).await.unwrap();
        index.cleanup();
        index.cleanup();
        let err = index.search("security", "user-1", None).await.unwrap_err();
        assert_eq!(err.error, ZkimError::OprfNotInitialized);
    }

    #[tokio::test]
    async fn save_snapshot_without_storage_is_a_no_op() {
        let index = SearchableIndex::new(IndexConfig::default());
        index.save_snapshot().await.unwrap();
        index.load_snapshot().await.unwrap();
    }

    #[tokio::test]
    async fn snapshot_round_trips_indexed_files_and_epoch() {
        use zkim_core::storage::InMemoryBackend;

        let mut config = IndexConfig::default();
        config.enable_autosave_timer = false;
        let backend = Arc::new(InMemoryBackend::new());
        let index = SearchableIndex::with_storage(config.clone(), backend.clone());
        let md = metadata_with("user-1", "doc.txt", &["security"]);
        index.index_file("f1", "o1", &md).await.unwrap();
        index.advance_epoch();
        index.save_snapshot().await.unwrap();

        let restored = SearchableIndex::with_storage(config, backend);
        restored.load_snapshot().await.unwrap();
        assert_eq!(restored.current_epoch(), index.current_epoch());

        let hits = restored.search("security", "user-1", None).await.unwrap();
        assert!(hits.iter().any(|h| h.file_id == "f1"));
    }

    #[tokio::test]
    async fn load_snapshot_without_a_prior_save_is_a_no_op() {
        use zkim_core::storage::InMemoryBackend;

        let mut config = IndexConfig::default();
        config.enable_autosave_timer = false;
        let backend = Arc::new(InMemoryBackend::new());
        let index = SearchableIndex::with_storage(config, backend);
        index.load_snapshot().await.unwrap();
        assert_eq!(index.current_epoch(), 0);
    }
}
