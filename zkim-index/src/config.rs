//! Runtime configuration for the searchable index.
//!
//! Named fields with an explicit `Default`, in the style of
//! `zkim_core::config::ZkimConfig`. Covers every index-only option;
//! core-only options (`chunk_size`, compression, ...) stay in `ZkimConfig`.

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct IndexConfig {
    /// How long a trapdoor lives, and how long a per-user query count
    /// accumulates before `advance_epoch` resets it. Default 24 hours.
    pub epoch_duration: Duration,
    /// Per-user, per-epoch search budget. The `(N+1)`-th search in one
    /// epoch returns `RateLimitExceeded`.
    pub max_queries_per_epoch: u32,
    /// Result-count buckets `search` pads to when `enable_result_padding`
    /// is set (shared padding logic with `zkim_core::bucket::next_bucket`).
    pub bucket_sizes: Vec<usize>,
    /// Adds uniform noise in `[-0.05, 0.05]` to each relevance score and
    /// Fisher-Yates shuffles results before padding/truncation.
    pub enable_privacy_enhancement: bool,
    /// Pads the result list up to the smallest enclosing bucket with
    /// synthetic low-relevance entries, then shuffles again.
    pub enable_result_padding: bool,
    /// Records one `QueryHistoryEntry` per search; cleared on each epoch
    /// tick. Independent of rate limiting's per-user counters.
    pub enable_query_logging: bool,
    /// Enforces `max_queries_per_epoch`. Disabled only for local tooling
    /// and tests that need unlimited searches.
    pub enable_rate_limiting: bool,
    /// Runs `rotate_trapdoors` automatically on each epoch tick. When
    /// false, a caller must call it explicitly.
    pub enable_trapdoor_rotation: bool,
    /// Spawns a `tokio` background task that calls `advance_epoch` every
    /// `epoch_duration`. Suppressed in tests (`spec.md` §5 timer rule).
    pub enable_epoch_timer: bool,
    /// Spawns a `tokio` background task that calls `save_snapshot` every
    /// `autosave_interval`, when the index was constructed with a storage
    /// backend (`SearchableIndex::with_storage`). A no-op otherwise; still
    /// suppressible independently of `enable_epoch_timer` (`spec.md` §5/§9:
    /// "the index's epoch and auto-save timers must be suppressible").
    pub enable_autosave_timer: bool,
    /// How often the autosave task persists a snapshot.
    pub autosave_interval: std::time::Duration,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            epoch_duration: Duration::from_secs(24 * 60 * 60),
            max_queries_per_epoch: 100,
            bucket_sizes: vec![32, 64, 128, 256, 512, 1024],
            enable_privacy_enhancement: true,
            enable_result_padding: true,
            enable_query_logging: true,
            enable_rate_limiting: true,
            enable_trapdoor_rotation: true,
            enable_epoch_timer: false,
            enable_autosave_timer: true,
            autosave_interval: Duration::from_secs(5 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let config = IndexConfig::default();
        assert_eq!(config.epoch_duration, Duration::from_secs(86400));
        assert_eq!(config.max_queries_per_epoch, 100);
        assert_eq!(config.bucket_sizes, vec![32, 64, 128, 256, 512, 1024]);
        assert!(!config.enable_epoch_timer);
        assert!(config.enable_autosave_timer);
        assert_eq!(config.autosave_interval, Duration::from_secs(300));
    }
}
