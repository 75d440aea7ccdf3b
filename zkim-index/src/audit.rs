//! Structured audit events for index operations: one typed event per
//! `index_file`, `search`, `rotate_trapdoors`, and `advance_epoch`,
//! recorded through a pluggable sink rather than a metrics exporter.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum IndexEvent {
    FileIndexed { file_id: String, token_count: usize },
    FileRemoved { file_id: String },
    IndexUpdated { file_id: String },
    QueryExecuted { user_id: String, epoch: u64, result_count: usize },
    QueryRateLimited { user_id: String, epoch: u64 },
    TrapdoorRejected { user_id: String, trapdoor_id: String },
    TrapdoorsRotated { revoked: usize, usage_reset: usize },
    EpochAdvanced { epoch: u64 },
}

#[derive(Debug, Clone)]
pub struct IndexAuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: IndexEvent,
}

/// Where index audit events go. Synchronous — no `async_trait` dependency
/// for something this lightweight.
pub trait IndexAuditSink: Send + Sync {
    fn record(&self, event: IndexEvent);
}

/// Logs events via `tracing`.
pub struct TracingAuditSink;

impl IndexAuditSink for TracingAuditSink {
    fn record(&self, event: IndexEvent) {
        tracing::info!(event = ?event, "zkim-index audit");
    }
}

/// Collects events in memory, for tests and for callers that want to
/// inspect history without wiring up a real sink.
#[derive(Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<IndexAuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<IndexAuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl IndexAuditSink for InMemoryAuditSink {
    fn record(&self, event: IndexEvent) {
        self.entries.lock().unwrap().push(IndexAuditEntry {
            timestamp: Utc::now(),
            event,
        });
    }
}

/// No-op sink, used as the default when a caller doesn't care about audit
/// history (mirrors the teacher's pattern of always having a sink wired,
/// never an `Option`).
pub struct NullAuditSink;

impl IndexAuditSink for NullAuditSink {
    fn record(&self, _event: IndexEvent) {}
}

pub(crate) fn arc_default_sink() -> Arc<dyn IndexAuditSink> {
    Arc::new(NullAuditSink)
}
