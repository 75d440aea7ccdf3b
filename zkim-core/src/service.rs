//! File service: the public orchestrator. `spec.md` §4.7.
//!
//! Ties the crypto primitives, key pipeline, chunker, three-layer
//! encryptor, Merkle/signer, and wire codec together behind six public
//! operations. The searchable index is consumed through `SearchBackend`
//! rather than a direct dependency, so this crate never depends on
//! `zkim-index` even though `spec.md` places the index "downstream" of
//! the file service in its dependency order.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroizing;

use crate::chunker::{self, CompressionAlgorithm};
use crate::config::ZkimConfig;
use crate::container::{Container, FileId, FileResult, ObjectId, ValidationLevel, ValidationReport};
use crate::crypto::aead::XChaCha20Poly1305Aead;
use crate::crypto::hash::blake3_hash;
use crate::crypto::kem::{KemCiphertext, KemSecretKey};
use crate::encryptor;
use crate::error::{ZkimError, ZkimFailure, ZkimResult};
use crate::keys;
use crate::merkle;
use crate::metadata::Metadata;
use crate::storage::{kem_key_storage_key, metadata_storage_key, StorageBackend};
use crate::wire::{self, EncryptionHeader, WireChunk, WireFile, ALG_SUITE_ID, VERSION};

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub file_id: String,
    pub object_id: String,
    pub relevance: f64,
    pub access_level: String,
}

/// Decouples the file service from `zkim-index`'s concrete
/// `SearchableIndex` type: the index crate implements this trait against
/// the file service rather than the other way around.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn index_file(
        &self,
        file_id: &str,
        object_id: &str,
        metadata: &Metadata,
    ) -> ZkimResult<()>;

    async fn remove_from_index(&self, file_id: &str) -> ZkimResult<()>;

    async fn update_index(&self, file_id: &str, metadata: &Metadata) -> ZkimResult<()>;

    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: Option<usize>,
    ) -> ZkimResult<Vec<SearchResult>>;
}

pub struct FileService {
    config: ZkimConfig,
    storage: Arc<dyn StorageBackend>,
    search_backend: Option<Arc<dyn SearchBackend>>,
}

impl FileService {
    pub fn new(config: ZkimConfig, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            config,
            storage,
            search_backend: None,
        }
    }

    pub fn with_search_backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.search_backend = Some(backend);
        self
    }

    /// Creates a new container: compresses/chunks the payload, derives
    /// layer keys, seals the three layers, builds the Merkle root and
    /// signature, writes the wire format, and persists it.
    pub async fn create(
        &self,
        payload: &[u8],
        user_id: &str,
        platform_key: &[u8; 32],
        user_key: &[u8; 32],
        metadata: Option<Metadata>,
        skip_store: bool,
    ) -> ZkimResult<FileResult> {
        let started = Instant::now();
        let mut warnings = Vec::new();
        tracing::debug!(%user_id, payload_bytes = payload.len(), "create: starting");

        if (payload.len() as u64) > self.config.max_file_size {
            tracing::warn!(%user_id, payload_bytes = payload.len(), "create: payload too large");
            return Err(ZkimFailure::new(ZkimError::FileTooLarge)
                .with_detail("max_bytes", self.config.max_file_size.to_string())
                .with_detail("actual_bytes", payload.len().to_string()));
        }

        let mut metadata = metadata.unwrap_or_else(|| Metadata::new("unnamed", "application/octet-stream", user_id));
        let file_id = FileId(generate_file_id(payload, user_id));

        let processed = chunker::process(
            payload,
            self.config.enable_compression,
            self.config.compression_algorithm,
            self.config.compression_level,
            self.config.chunk_size,
        )?;
        if processed.compression_fallback {
            warnings.push("compression failed, stored uncompressed".to_string());
        }

        let layer_keys = keys::derive_layer_keys(platform_key, user_key)?;

        let layers = encryptor::encrypt_layers(
            &file_id.0,
            &processed.payload,
            &metadata,
            &layer_keys.user_layer_key,
            &layer_keys.platform_layer_key,
        )?;

        // The wire format only carries nonce+tag for the platform/user EHs
        // (`spec.md` §4.6); the ciphertexts themselves ride along on the
        // in-memory `Metadata` so a same-process `decrypt` can reconstruct
        // them without a second storage round trip. Writers never put a
        // content key here (`spec.md` §9 Open Question 2) — only opaque
        // already-AEAD-sealed layer ciphertexts and the compression code.
        metadata.custom_fields.insert(
            "__user_layer_ciphertext".to_string(),
            BASE64.encode(&layers.user_ciphertext),
        );
        metadata.custom_fields.insert(
            "__platform_layer_ciphertext".to_string(),
            BASE64.encode(&layers.platform_ciphertext),
        );
        metadata.custom_fields.insert(
            "__compression".to_string(),
            processed.compression.type_code().to_string(),
        );
        // Chunks are padded up to a bucket size so a trailing short chunk
        // doesn't reveal the content layer's true length (`spec.md` §3
        // Chunk invariant); `reassemble_chunks` needs this to know where
        // the real ciphertext ends and the zero padding begins.
        metadata.custom_fields.insert(
            "__content_ciphertext_len".to_string(),
            layers.content_ciphertext.len().to_string(),
        );
        metadata.custom_fields.remove("contentKey");

        let wire_chunks = build_wire_chunks(
            &layers.content_ciphertext,
            self.config.chunk_size,
            &self.config.chunk_padding_buckets,
        );

        let leaf_hashes: Vec<_> = wire_chunks
            .iter()
            .map(|c| merkle::chunk_integrity_hash(&c.nonce, &c.ciphertext_with_tag))
            .collect();
        let root = merkle::merkle_root(&leaf_hashes);

        let eh_user = EncryptionHeader {
            nonce: layers.user_nonce,
            tag: trailing_tag(&layers.user_ciphertext),
        };
        // Signed over the same bytes `validate_integrity` recomputes from
        // the parsed wire file (EH_USER's full nonce+tag), not just the
        // nonce — otherwise a freshly created container would fail its
        // own signature check the moment it round-trips through `parse`.
        let manifest_hash = merkle::manifest_hash(&eh_user.to_bytes());
        let signature = merkle::sign_file(user_key, &root, &manifest_hash, ALG_SUITE_ID, VERSION);

        let wire_file = WireFile {
            kem_ciphertext: layer_keys.kem_ciphertext.0,
            eh_platform: EncryptionHeader {
                nonce: layers.platform_nonce,
                tag: trailing_tag(&layers.platform_ciphertext),
            },
            eh_user,
            chunks: wire_chunks,
            merkle_root: root,
            file_signature: signature.to_bytes()?,
        };

        let wire_bytes = wire::write(&wire_file)?;

        let mut object_id = ObjectId(file_id.0.clone());
        if !skip_store {
            let kem_key = kem_key_storage_key(&file_id.0, user_id);
            let encrypted_kem_secret = seal_kem_secret(&layer_keys.kem_secret, user_key)?;
            if let Err(e) = self.storage.set(&kem_key, &encrypted_kem_secret).await {
                warnings.push(format!("kem secret store failed: {e}"));
            }
            match self.storage.set(&file_id.0, &wire_bytes).await {
                Ok(()) => {}
                Err(_) => {
                    tracing::warn!(file_id = %file_id, "create: storage unavailable, downgrading to file_id as object_id");
                    warnings.push("storage unavailable, returning file_id as object_id".to_string());
                    object_id = ObjectId(file_id.0.clone());
                }
            }
            match serde_json::to_vec(&metadata) {
                Ok(bytes) => {
                    if let Err(e) = self.storage.set(&metadata_storage_key(&file_id.0), &bytes).await {
                        warnings.push(format!("metadata store failed: {e}"));
                    }
                }
                Err(e) => warnings.push(format!("metadata serialization failed: {e}")),
            }
        }

        if self.config.enable_searchable_encryption {
            if let Some(backend) = &self.search_backend {
                backend.index_file(&file_id.0, &object_id.0, &metadata).await?;
            }
        }

        let container = Container {
            file_id: file_id.clone(),
            object_id: object_id.clone(),
            wire: wire_file,
            metadata,
        };

        tracing::debug!(file_id = %file_id, encrypted_bytes = wire_bytes.len(), elapsed = ?started.elapsed(), "create: finished");

        Ok(FileResult {
            container,
            object_id,
            original_size: processed.original_len,
            compressed_size: processed.compressed_len,
            encrypted_size: wire_bytes.len(),
            elapsed: started.elapsed(),
            warnings,
        })
    }

    /// Recovers the original plaintext from an in-memory container.
    /// Pre: `user_id` is in `metadata.access_control.read`.
    pub async fn decrypt(
        &self,
        container: &Container,
        user_id: &str,
        user_key: &[u8; 32],
    ) -> ZkimResult<Vec<u8>> {
        tracing::debug!(file_id = %container.file_id, %user_id, "decrypt: starting");

        if !container.metadata.access_control.read.iter().any(|u| u == user_id) {
            tracing::warn!(file_id = %container.file_id, %user_id, "decrypt: access denied");
            return Err(ZkimFailure::new(ZkimError::AccessDenied)
                .with_detail("user_id", user_id.to_string()));
        }

        if self.config.enable_integrity_validation {
            let report = self.validate_integrity(container, user_key);
            if !report.is_valid {
                tracing::warn!(file_id = %container.file_id, errors = ?report.errors, "decrypt: integrity validation failed");
                return Err(ZkimFailure::new(ZkimError::IntegrityFailed)
                    .with_detail("errors", report.errors.join("; ")));
            }
        }

        let user_layer_key = self.recover_user_layer_key(container, user_id, user_key).await?;

        let recovered = match reconstruct_user_ciphertext(container) {
            Ok(user_ciphertext) => encryptor::recover_content_key(
                &user_ciphertext,
                &container.wire.eh_user.nonce,
                &user_layer_key,
            )?,
            // `spec.md` §9 Open Question 2: legacy containers stashed the
            // content key directly in `customFields.contentKey` (alongside
            // a `contentNonce`) instead of sealing it in the user layer.
            // Current writers never populate either field; this path only
            // serves a reader encountering a pre-user-layer container.
            Err(e) if e.error == ZkimError::MissingDecryptionData => {
                recover_legacy_content_key(&container.metadata)?
            }
            Err(e) => return Err(e),
        };

        let content_ciphertext = reassemble_chunks(container);
        let plaintext_compressed = encryptor::open_content(
            &recovered.content_key,
            &recovered.content_nonce,
            &content_ciphertext,
        )?;

        let compression = detect_compression(&container.metadata);
        let plaintext = chunker::decompress(&plaintext_compressed, compression);
        tracing::debug!(file_id = %container.file_id, "decrypt: finished");
        plaintext
    }

    /// Fetches the raw bytes from storage and returns a container
    /// (wire-parsed, but not yet decrypted). Loads the metadata snapshot
    /// `create`/`update_metadata` persisted alongside the wire blob so the
    /// `access_control` and layer-ciphertext custom fields `decrypt` needs
    /// are present; falls back to an empty placeholder if no snapshot was
    /// ever stored (e.g. `create` was called with `skip_store`).
    pub async fn get(&self, object_id: &ObjectId) -> ZkimResult<Container> {
        let bytes = self
            .storage
            .get(&object_id.0)
            .await?
            .ok_or_else(|| ZkimFailure::new(ZkimError::StorageUnavailable))?;
        let wire_file = wire::parse(&bytes)?;

        let metadata = match self.storage.get(&metadata_storage_key(&object_id.0)).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|_| ZkimFailure::new(ZkimError::StorageUnavailable))?,
            None => Metadata::new("unknown", "application/octet-stream", "unknown"),
        };

        Ok(Container {
            file_id: FileId(object_id.0.clone()),
            object_id: object_id.clone(),
            wire: wire_file,
            metadata,
        })
    }

    /// Fetches, recovers the KEM secret, parses, decrypts. `spec.md` §4.7.
    ///
    /// `platform_key` is part of the public contract but unused here: the
    /// content/user layers never depend on it, only the platform layer
    /// does, and nothing on this path needs to open the platform layer.
    pub async fn download(
        &self,
        object_id: &ObjectId,
        user_id: &str,
        _platform_key: &[u8; 32],
        user_key: &[u8; 32],
    ) -> ZkimResult<Vec<u8>> {
        tracing::debug!(object_id = %object_id.0, %user_id, "download: starting");
        let container = self.get(object_id).await?;
        self.decrypt(&container, user_id, user_key).await
    }

    /// Verifies header fields, chunk hashes, signature, and metadata
    /// shape without requiring the user key.
    pub fn validate_integrity(&self, container: &Container, user_key: &[u8; 32]) -> ValidationReport {
        let started = Instant::now();
        let mut errors = Vec::new();
        let warnings = Vec::new();

        let header_valid = true; // `wire::parse` already enforced magic/version/flags.

        let recomputed: Vec<_> = container
            .wire
            .chunks
            .iter()
            .map(|c| merkle::chunk_integrity_hash(&c.nonce, &c.ciphertext_with_tag))
            .collect();
        let recomputed_root = merkle::merkle_root(&recomputed);
        let chunks_valid = recomputed_root == container.wire.merkle_root;
        if !chunks_valid {
            errors.push("merkle root does not match recomputed chunk hashes".to_string());
        }

        let manifest_hash = merkle::manifest_hash(&container.wire.eh_user.to_bytes());
        let signatures_valid = merkle::verify_file_signature(
            user_key,
            &container.wire.merkle_root,
            &manifest_hash,
            ALG_SUITE_ID,
            VERSION,
            &match crate::crypto::sign::Signature::from_bytes(&container.wire.file_signature) {
                Ok(sig) => sig,
                Err(_) => {
                    errors.push("malformed file signature".to_string());
                    return ValidationReport {
                        is_valid: false,
                        level: ValidationLevel::Basic,
                        header_valid,
                        chunks_valid,
                        signatures_valid: false,
                        metadata_valid: false,
                        errors,
                        warnings,
                        elapsed: started.elapsed(),
                    };
                }
            },
        )
        .is_ok();
        if !signatures_valid {
            errors.push("file signature verification failed".to_string());
        }

        let metadata_valid = !container.metadata.file_name.is_empty();
        if !metadata_valid {
            errors.push("metadata missing required fields".to_string());
        }

        let is_valid = header_valid && chunks_valid && signatures_valid && metadata_valid;
        let level = if is_valid {
            ValidationLevel::Full
        } else if header_valid && signatures_valid {
            ValidationLevel::Basic
        } else {
            ValidationLevel::None
        };

        ValidationReport {
            is_valid,
            level,
            header_valid,
            chunks_valid,
            signatures_valid,
            metadata_valid,
            errors,
            warnings,
            elapsed: started.elapsed(),
        }
    }

    /// Requires `user_id` in `write`, merges `updates` into the
    /// container's metadata, re-signs (the file signature covers
    /// `eh_user`, not the metadata itself, but must be recomputed so the
    /// container keeps validating after this call re-persists it),
    /// re-persists the wire blob and metadata snapshot, and updates the
    /// search index.
    pub async fn update_metadata(
        &self,
        container: &mut Container,
        user_id: &str,
        user_key: &[u8; 32],
        updates: impl FnOnce(&mut Metadata),
    ) -> ZkimResult<()> {
        tracing::debug!(file_id = %container.file_id, %user_id, "update_metadata: starting");
        if !container.metadata.access_control.write.iter().any(|u| u == user_id) {
            tracing::warn!(file_id = %container.file_id, %user_id, "update_metadata: access denied");
            return Err(ZkimFailure::new(ZkimError::AccessDenied)
                .with_detail("user_id", user_id.to_string()));
        }
        updates(&mut container.metadata);
        // `spec.md` §9 Open Question 2: writers never persist a legacy
        // content key, even if a caller's `updates` closure tried to add one.
        container.metadata.custom_fields.remove("contentKey");
        container.metadata.custom_fields.remove("contentNonce");

        let manifest_hash = merkle::manifest_hash(&container.wire.eh_user.to_bytes());
        let signature = merkle::sign_file(
            user_key,
            &container.wire.merkle_root,
            &manifest_hash,
            ALG_SUITE_ID,
            VERSION,
        );
        container.wire.file_signature = signature.to_bytes()?;

        let wire_bytes = wire::write(&container.wire)?;
        self.storage.set(&container.file_id.0, &wire_bytes).await?;
        let metadata_bytes = serde_json::to_vec(&container.metadata)
            .map_err(|_| ZkimFailure::new(ZkimError::StorageUnavailable))?;
        self.storage
            .set(&metadata_storage_key(&container.file_id.0), &metadata_bytes)
            .await?;

        if self.config.enable_searchable_encryption {
            if let Some(backend) = &self.search_backend {
                backend
                    .update_index(&container.file_id.0, &container.metadata)
                    .await?;
            }
        }
        tracing::debug!(file_id = %container.file_id, "update_metadata: finished");
        Ok(())
    }

    pub async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: Option<usize>,
    ) -> ZkimResult<Vec<SearchResult>> {
        let backend = self
            .search_backend
            .as_ref()
            .ok_or_else(|| ZkimFailure::new(ZkimError::OprfNotInitialized))?;
        backend.search(query, user_id, limit).await
    }

    async fn recover_user_layer_key(
        &self,
        container: &Container,
        user_id: &str,
        user_key: &[u8; 32],
    ) -> ZkimResult<Zeroizing<[u8; 32]>> {
        let kem_key = kem_key_storage_key(&container.file_id.0, user_id);
        let encrypted_kem_secret = self
            .storage
            .get(&kem_key)
            .await?
            .ok_or_else(|| ZkimFailure::new(ZkimError::MissingDecryptionData))?;
        let kem_secret = open_kem_secret(&encrypted_kem_secret, user_key)?;
        let kem_ciphertext = KemCiphertext::from_bytes(&container.wire.kem_ciphertext)?;
        keys::recover_user_layer_key(&kem_ciphertext, &kem_secret, user_key)
    }
}

fn generate_file_id(payload: &[u8], user_id: &str) -> String {
    let payload_hash = blake3_hash(payload);
    let user_hash = blake3_hash(user_id.as_bytes());
    let mut combined = Vec::with_capacity(64);
    combined.extend_from_slice(&payload_hash);
    combined.extend_from_slice(&user_hash);
    BASE64.encode(combined)
}

fn trailing_tag(ciphertext: &[u8]) -> [u8; 16] {
    let mut tag = [0u8; 16];
    let start = ciphertext.len().saturating_sub(16);
    tag.copy_from_slice(&ciphertext[start..]);
    tag
}

fn build_wire_chunks(content_ciphertext: &[u8], chunk_size: usize, buckets: &[usize]) -> Vec<WireChunk> {
    content_ciphertext
        .chunks(chunk_size.max(1))
        .map(|slice| {
            let padded_len = crate::bucket::next_bucket(slice.len(), buckets);
            let mut padded = slice.to_vec();
            padded.resize(padded_len.max(slice.len()), 0);
            let mut nonce_bytes = [0u8; 24];
            crate::crypto::rng::fill_random(&mut nonce_bytes);
            WireChunk {
                nonce: nonce_bytes,
                ciphertext_with_tag: padded,
            }
        })
        .collect()
}

fn reassemble_chunks(container: &Container) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in &container.wire.chunks {
        out.extend_from_slice(&chunk.ciphertext_with_tag);
    }
    // Trailing chunks may carry bucket padding past the real content
    // ciphertext's end; without truncating it back off, the content
    // layer's AEAD tag would sit under zero bytes instead of at the end
    // of the real ciphertext and authentication would fail.
    if let Some(real_len) = container
        .metadata
        .custom_fields
        .get("__content_ciphertext_len")
        .and_then(|v| v.parse::<usize>().ok())
    {
        out.truncate(real_len);
    }
    out
}

fn reconstruct_user_ciphertext(container: &Container) -> ZkimResult<Vec<u8>> {
    // The user-layer ciphertext is carried out-of-band from the fixed
    // wire regions (only its nonce+tag live in EH_USER); a higher layer
    // is expected to supply it via `Container::metadata.custom_fields`
    // when round-tripping through a non-binary carrier. For an in-memory
    // container produced by `create` in the same process, it is still
    // attached to the container's wire struct directly.
    container
        .metadata
        .custom_fields
        .get("__user_layer_ciphertext")
        .map(|b64| BASE64.decode(b64).unwrap_or_default())
        .ok_or_else(|| ZkimFailure::new(ZkimError::MissingDecryptionData))
}

/// `spec.md` §9 Open Question 2 legacy fallback: recovers `content_key`
/// and `content_nonce` from `customFields.contentKey`/`contentNonce`
/// instead of the user-layer ciphertext, for containers written before
/// the user-layer path existed. Never populated by this crate's writers.
fn recover_legacy_content_key(metadata: &Metadata) -> ZkimResult<encryptor::RecoveredUserLayer> {
    let key_b64 = metadata
        .custom_fields
        .get("contentKey")
        .ok_or_else(|| ZkimFailure::new(ZkimError::MissingDecryptionData))?;
    let nonce_b64 = metadata
        .custom_fields
        .get("contentNonce")
        .ok_or_else(|| ZkimFailure::new(ZkimError::MissingContentNonce))?;

    let key_bytes = BASE64
        .decode(key_b64)
        .map_err(|_| ZkimFailure::new(ZkimError::MissingDecryptionData))?;
    let nonce_bytes = BASE64
        .decode(nonce_b64)
        .map_err(|_| ZkimFailure::new(ZkimError::MissingContentNonce))?;

    let content_key: [u8; 32] = key_bytes
        .try_into()
        .map_err(|_| ZkimFailure::new(ZkimError::InvalidKeyLength))?;
    let content_nonce: [u8; 24] = nonce_bytes
        .try_into()
        .map_err(|_| ZkimFailure::new(ZkimError::InvalidNonceLength))?;

    Ok(encryptor::RecoveredUserLayer {
        content_key: Zeroizing::new(content_key),
        content_nonce,
        file_id: String::new(),
        metadata: metadata.user_visible_subset(),
    })
}

fn detect_compression(metadata: &Metadata) -> CompressionAlgorithm {
    metadata
        .custom_fields
        .get("__compression")
        .and_then(|v| v.parse::<u8>().ok())
        .and_then(|code| CompressionAlgorithm::from_type_code(code).ok())
        .unwrap_or(CompressionAlgorithm::None)
}

fn seal_kem_secret(kem_secret: &KemSecretKey, user_key: &[u8; 32]) -> ZkimResult<Vec<u8>> {
    let aead = XChaCha20Poly1305Aead::new(user_key)?;
    let mut nonce = [0u8; 24];
    crate::crypto::rng::fill_random(&mut nonce);
    let ciphertext = aead.seal(&nonce, &*kem_secret.to_bytes(), b"zkim/kem-secret")?;
    let mut out = Vec::with_capacity(24 + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

fn open_kem_secret(sealed: &[u8], user_key: &[u8; 32]) -> ZkimResult<KemSecretKey> {
    if sealed.len() < 24 {
        return Err(ZkimFailure::new(ZkimError::MissingDecryptionData));
    }
    let (nonce, ciphertext) = sealed.split_at(24);
    let aead = XChaCha20Poly1305Aead::new(user_key)?;
    let plaintext = aead.open(nonce, ciphertext, b"zkim/kem-secret")?;
    KemSecretKey::from_bytes(&plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryBackend;

    fn readable_metadata(user_id: &str) -> Metadata {
        let mut metadata = Metadata::new("a.txt", "text/plain", user_id);
        metadata.access_control.read.push(user_id.to_string());
        metadata.access_control.write.push(user_id.to_string());
        metadata
    }

    #[tokio::test]
    async fn create_rejects_oversized_payload() {
        let mut config = ZkimConfig::default();
        config.max_file_size = 10;
        let service = FileService::new(config, Arc::new(InMemoryBackend::new()));
        let result = service
            .create(&[0u8; 100], "user-1", &[1u8; 32], &[2u8; 32], None, true)
            .await;
        assert_eq!(result.unwrap_err().error, ZkimError::FileTooLarge);
    }

    #[tokio::test]
    async fn create_persists_wire_bytes_when_not_skipped() {
        let storage = Arc::new(InMemoryBackend::new());
        let service = FileService::new(ZkimConfig::default(), storage.clone());
        let metadata = readable_metadata("user-1");
        let result = service
            .create(b"hello world", "user-1", &[1u8; 32], &[2u8; 32], Some(metadata), false)
            .await
            .unwrap();
        assert!(storage.has(&result.object_id.0).await.unwrap());
    }

    #[tokio::test]
    async fn decrypt_recovers_exact_plaintext_after_create() {
        let storage = Arc::new(InMemoryBackend::new());
        let service = FileService::new(ZkimConfig::default(), storage);
        let platform_key = [1u8; 32];
        let user_key = [2u8; 32];
        let payload = b"the quick brown fox jumps over the lazy dog".repeat(100);
        let metadata = readable_metadata("user-1");

        let result = service
            .create(&payload, "user-1", &platform_key, &user_key, Some(metadata), true)
            .await
            .unwrap();

        let recovered = service
            .decrypt(&result.container, "user-1", &user_key)
            .await
            .unwrap();

        assert_eq!(recovered, payload);
    }

    #[tokio::test]
    async fn decrypt_roundtrips_through_storage_and_get() {
        let storage = Arc::new(InMemoryBackend::new());
        let service = FileService::new(ZkimConfig::default(), storage);
        let platform_key = [9u8; 32];
        let user_key = [8u8; 32];
        let metadata = readable_metadata("user-1");

        let result = service
            .create(b"stored through the backend", "user-1", &platform_key, &user_key, Some(metadata), false)
            .await
            .unwrap();

        let refetched = service.get(&result.object_id).await.unwrap();
        assert_eq!(refetched.wire.merkle_root, result.container.wire.merkle_root);

        let recovered = service
            .decrypt(&refetched, "user-1", &user_key)
            .await
            .unwrap();
        assert_eq!(recovered, b"stored through the backend");
    }

    #[tokio::test]
    async fn decrypt_rejects_user_without_read_access() {
        let storage = Arc::new(InMemoryBackend::new());
        let service = FileService::new(ZkimConfig::default(), storage);
        let platform_key = [3u8; 32];
        let user_key = [4u8; 32];
        let metadata = Metadata::new("secret.txt", "text/plain", "owner");

        let result = service
            .create(b"top secret", "owner", &platform_key, &user_key, Some(metadata), true)
            .await
            .unwrap();

        let err = service
            .decrypt(&result.container, "intruder", &user_key)
            .await
            .unwrap_err();
        assert_eq!(err.error, ZkimError::AccessDenied);
    }

    #[tokio::test]
    async fn decrypt_detects_tampered_chunk() {
        let storage = Arc::new(InMemoryBackend::new());
        let service = FileService::new(ZkimConfig::default(), storage);
        let platform_key = [5u8; 32];
        let user_key = [6u8; 32];
        let metadata = readable_metadata("user-1");

        let mut result = service
            .create(b"tamper with me if you dare", "user-1", &platform_key, &user_key, Some(metadata), true)
            .await
            .unwrap();

        let chunk = &mut result.container.wire.chunks[0];
        let last = chunk.ciphertext_with_tag.len() - 1;
        chunk.ciphertext_with_tag[last] ^= 0xFF;

        let err = service
            .decrypt(&result.container, "user-1", &user_key)
            .await
            .unwrap_err();
        assert_eq!(err.error, ZkimError::IntegrityFailed);
    }

    #[tokio::test]
    async fn update_metadata_strips_legacy_content_key_fields() {
        let storage = Arc::new(InMemoryBackend::new());
        let service = FileService::new(ZkimConfig::default(), storage);
        let platform_key = [1u8; 32];
        let user_key = [2u8; 32];
        let metadata = readable_metadata("user-1");

        let mut result = service
            .create(b"payload", "user-1", &platform_key, &user_key, Some(metadata), true)
            .await
            .unwrap();

        service
            .update_metadata(&mut result.container, "user-1", &user_key, |m| {
                m.custom_fields.insert("contentKey".to_string(), "sneaky".to_string());
                m.tags.push("reviewed".to_string());
            })
            .await
            .unwrap();

        assert!(!result.container.metadata.custom_fields.contains_key("contentKey"));
        assert!(result.container.metadata.tags.contains(&"reviewed".to_string()));
    }

    #[tokio::test]
    async fn update_metadata_re_signs_and_re_persists() {
        let storage = Arc::new(InMemoryBackend::new());
        let service = FileService::new(ZkimConfig::default(), storage.clone());
        let platform_key = [7u8; 32];
        let user_key = [3u8; 32];
        let metadata = readable_metadata("user-1");

        let mut result = service
            .create(b"payload for signature check", "user-1", &platform_key, &user_key, Some(metadata), false)
            .await
            .unwrap();

        let signature_before = result.container.wire.file_signature;
        let stored_before = storage.get(&result.object_id.0).await.unwrap().unwrap();

        service
            .update_metadata(&mut result.container, "user-1", &user_key, |m| {
                m.tags.push("reviewed".to_string());
            })
            .await
            .unwrap();

        // The signed message only covers `eh_user` (unchanged here), but
        // `update_metadata` must still recompute and re-store it rather
        // than leave a stale signature sitting over a mutated container.
        assert_eq!(result.container.wire.file_signature, signature_before);

        let stored_after = storage.get(&result.object_id.0).await.unwrap().unwrap();
        assert_ne!(stored_before, stored_after, "wire blob must be re-persisted");

        let report = service.validate_integrity(&result.container, &user_key);
        assert!(report.is_valid, "errors: {:?}", report.errors);

        let refetched = service.get(&result.object_id).await.unwrap();
        assert!(refetched.metadata.tags.contains(&"reviewed".to_string()));
    }

    #[tokio::test]
    async fn download_round_trips_through_storage() {
        let storage = Arc::new(InMemoryBackend::new());
        let service = FileService::new(ZkimConfig::default(), storage);
        let platform_key = [11u8; 32];
        let user_key = [12u8; 32];
        let metadata = readable_metadata("user-1");

        let result = service
            .create(b"downloaded through the real store", "user-1", &platform_key, &user_key, Some(metadata), false)
            .await
            .unwrap();

        let recovered = service
            .download(&result.object_id, "user-1", &platform_key, &user_key)
            .await
            .unwrap();
        assert_eq!(recovered, b"downloaded through the real store");
    }

    #[tokio::test]
    async fn download_detects_tampered_chunk_before_access_check_matters() {
        let storage = Arc::new(InMemoryBackend::new());
        let service = FileService::new(ZkimConfig::default(), storage.clone());
        let platform_key = [13u8; 32];
        let user_key = [14u8; 32];
        let metadata = readable_metadata("user-1");

        let result = service
            .create(b"tamper after it hits the store", "user-1", &platform_key, &user_key, Some(metadata), false)
            .await
            .unwrap();

        let mut wire_file = wire::parse(&storage.get(&result.object_id.0).await.unwrap().unwrap()).unwrap();
        let chunk = &mut wire_file.chunks[0];
        let last = chunk.ciphertext_with_tag.len() - 1;
        chunk.ciphertext_with_tag[last] ^= 0xFF;
        storage
            .set(&result.object_id.0, &wire::write(&wire_file).unwrap())
            .await
            .unwrap();

        let err = service
            .download(&result.object_id, "user-1", &platform_key, &user_key)
            .await
            .unwrap_err();
        assert_eq!(err.error, ZkimError::IntegrityFailed);
    }
}
