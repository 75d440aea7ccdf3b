//! Storage backend: where wire-format blobs and encrypted KEM secrets live.
//!
//! `spec.md` §6 treats the store as an external collaborator keyed by
//! opaque strings. Reserved key formats: `"zkim-kem-key:<file_id>:<user_id>"`
//! for encrypted KEM-secret blobs, `"zkim-metadata:<file_id>"` for the
//! metadata snapshot; everything else is a `file_id` mapping to a
//! wire-format blob.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{ZkimError, ZkimFailure, ZkimResult};

pub fn kem_key_storage_key(file_id: &str, user_id: &str) -> String {
    format!("zkim-kem-key:{file_id}:{user_id}")
}

/// Reserved key for the metadata snapshot `create`/`update_metadata`
/// persist alongside the wire blob. `get` loads it back so a `download`
/// through the store recovers the real `access_control`/custom fields
/// instead of an empty placeholder.
pub fn metadata_storage_key(file_id: &str) -> String {
    format!("zkim-metadata:{file_id}")
}

/// Backend for persisting container blobs and encrypted KEM secrets.
///
/// Implement this for your infrastructure:
/// - `InMemoryBackend` (testing)
/// - `FileBackend` (development)
/// - your object store / database (production)
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn set(&self, key: &str, bytes: &[u8]) -> ZkimResult<()>;
    async fn get(&self, key: &str) -> ZkimResult<Option<Vec<u8>>>;
    async fn has(&self, key: &str) -> ZkimResult<bool>;
    async fn delete(&self, key: &str) -> ZkimResult<()>;
    async fn clear(&self) -> ZkimResult<()>;
    async fn keys(&self) -> ZkimResult<Vec<String>>;
}

/// In-memory storage (testing and ephemeral use).
#[derive(Default)]
pub struct InMemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn set(&self, key: &str, bytes: &[u8]) -> ZkimResult<()> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> ZkimResult<Option<Vec<u8>>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.get(key).cloned())
    }

    async fn has(&self, key: &str) -> ZkimResult<bool> {
        let entries = self.entries.read().unwrap();
        Ok(entries.contains_key(key))
    }

    async fn delete(&self, key: &str) -> ZkimResult<()> {
        let mut entries = self.entries.write().unwrap();
        entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> ZkimResult<()> {
        let mut entries = self.entries.write().unwrap();
        entries.clear();
        Ok(())
    }

    async fn keys(&self) -> ZkimResult<Vec<String>> {
        let entries = self.entries.read().unwrap();
        Ok(entries.keys().cloned().collect())
    }
}

/// File-based storage (one blob file per key), for development and
/// single-node deployments.
///
/// Directory layout:
/// ```text
/// store/
///   {urlencoded-key}.bin
/// ```
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> ZkimResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|_| ZkimFailure::new(ZkimError::StorageUnavailable))?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", sanitize_key(key)))
    }
}

/// Keys carry colons (`zkim-kem-key:<file_id>:<user_id>`), which aren't
/// safe to use verbatim as a filesystem path component.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn set(&self, key: &str, bytes: &[u8]) -> ZkimResult<()> {
        let path = self.entry_path(key);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|_| ZkimFailure::new(ZkimError::StorageUnavailable))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|_| ZkimFailure::new(ZkimError::StorageUnavailable))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> ZkimResult<Option<Vec<u8>>> {
        let path = self.entry_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(_) => Err(ZkimFailure::new(ZkimError::StorageUnavailable)),
        }
    }

    async fn has(&self, key: &str) -> ZkimResult<bool> {
        Ok(self.entry_path(key).exists())
    }

    async fn delete(&self, key: &str) -> ZkimResult<()> {
        let path = self.entry_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(_) => Err(ZkimFailure::new(ZkimError::StorageUnavailable)),
        }
    }

    async fn clear(&self) -> ZkimResult<()> {
        for key in self.keys().await? {
            self.delete(&key).await?;
        }
        Ok(())
    }

    async fn keys(&self) -> ZkimResult<Vec<String>> {
        let mut out = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|_| ZkimFailure::new(ZkimError::StorageUnavailable))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|_| ZkimFailure::new(ZkimError::StorageUnavailable))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("bin") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    out.push(stem.to_string());
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_round_trip() {
        let backend = InMemoryBackend::new();
        backend.set("file-1", b"blob").await.unwrap();
        assert!(backend.has("file-1").await.unwrap());
        assert_eq!(backend.get("file-1").await.unwrap(), Some(b"blob".to_vec()));
        backend.delete("file-1").await.unwrap();
        assert!(!backend.has("file-1").await.unwrap());
    }

    #[tokio::test]
    async fn file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).unwrap();
        let key = kem_key_storage_key("file-123", "user-1");
        backend.set(&key, b"encrypted-kem-secret").await.unwrap();
        assert_eq!(
            backend.get(&key).await.unwrap(),
            Some(b"encrypted-kem-secret".to_vec())
        );
        let keys = backend.keys().await.unwrap();
        assert_eq!(keys.len(), 1);
        backend.clear().await.unwrap();
        assert!(backend.keys().await.unwrap().is_empty());
    }
}
