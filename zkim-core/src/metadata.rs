//! Metadata dictionary carried alongside a container (`spec.md` §3).
//!
//! A reader must never trust any field here before the file signature
//! verifies — `FileService::decrypt` checks the signature first and only
//! then hands metadata back to the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessControl {
    pub read: Vec<String>,
    pub write: Vec<String>,
    pub delete: Vec<String>,
}

/// Data-only retention policy (`spec.md` §3 names the field but leaves its
/// shape undefined; see `SPEC_FULL.md` §3 for the resolved shape). The file
/// service never enforces this — no GDPR/retention engine beyond carrying
/// the fields, per `spec.md`'s Non-goals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub retain_until: Option<DateTime<Utc>>,
    pub legal_hold: bool,
    pub delete_after_access_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    pub file_name: String,
    pub mime_type: String,
    pub tags: Vec<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub access_control: AccessControl,
    pub retention_policy: Option<RetentionPolicy>,
    /// Free-form fields. Legacy writers stashed `content_key` here
    /// (`customFields.contentKey`) before the user-layer encryption path
    /// existed; current writers never populate it (`spec.md` §9).
    pub custom_fields: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            tags: Vec::new(),
            user_id: user_id.into(),
            created_at: Utc::now(),
            access_control: AccessControl::default(),
            retention_policy: None,
            custom_fields: BTreeMap::new(),
        }
    }

    /// Legacy read path: some older containers stored the content key in
    /// `customFields.contentKey` rather than only in the encrypted user
    /// layer. Current writers never populate this field.
    pub fn legacy_content_key(&self) -> Option<&str> {
        self.custom_fields.get("contentKey").map(String::as_str)
    }

    /// Fields visible to the platform layer: no keys, no payload, just
    /// what the index/search surface needs.
    pub fn platform_visible_subset(&self) -> PlatformMetadata {
        PlatformMetadata {
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            tags: self.tags.clone(),
            user_id: self.user_id.clone(),
            created_at: self.created_at,
        }
    }

    /// Fields visible to the user layer alongside the recovered content
    /// key: everything except what's already public on the platform layer
    /// isn't excluded here, since the user already owns the whole record.
    pub fn user_visible_subset(&self) -> UserMetadata {
        UserMetadata {
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            tags: self.tags.clone(),
            access_control: self.access_control.clone(),
            retention_policy: self.retention_policy.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformMetadata {
    pub file_name: String,
    pub mime_type: String,
    pub tags: Vec<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserMetadata {
    pub file_name: String,
    pub mime_type: String,
    pub tags: Vec<String>,
    pub access_control: AccessControl,
    pub retention_policy: Option<RetentionPolicy>,
}
