//! Pluggable object storage for book assets.
//!
//! The [`ObjectStore`] trait captures the contract the asset lifecycle
//! needs from a store: existence checks, metadata, best-effort deletion,
//! direct-upload credentials, and read URLs. Two backends implement it:
//! [`s3::S3ObjectStore`] (networked) and [`local::LocalObjectStore`]
//! (filesystem), selected by [`config::StorageConfig`].

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use lectern_core::error::CoreError;
use lectern_core::types::Timestamp;

pub mod config;
pub mod local;
pub mod s3;

pub use config::{build_store, StorageBackendKind, StorageConfig};
pub use local::LocalObjectStore;
pub use s3::S3ObjectStore;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Validity window for upload credentials (1 hour).
pub const UPLOAD_CREDENTIAL_TTL_SECS: u64 = 3600;

/// Validity window for signed read URLs (1 hour).
pub const READ_URL_TTL_SECS: u64 = 3600;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Store-reported metadata for an object.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectMetadata {
    pub size_bytes: i64,
    pub content_type: String,
    pub last_modified: Option<Timestamp>,
}

/// A time-limited authorization for a direct client-to-store upload.
///
/// `url` plus `fields` is everything the client needs to perform the
/// upload without routing bytes through this backend.
#[derive(Debug, Clone, Serialize)]
pub struct UploadCredential {
    /// Where the client sends the upload.
    pub url: String,
    /// HTTP method the client must use.
    pub method: String,
    /// Headers/form fields the client must include.
    pub fields: BTreeMap<String, String>,
    /// The object key the upload lands at.
    pub key: String,
    /// Seconds until the credential expires.
    pub expires_in_secs: u64,
}

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid object key '{0}'")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        CoreError::StorageFault(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Contract between the asset lifecycle and an object store.
///
/// Calls may be slow network operations; callers must never hold a
/// database row lock across them.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Prepare the backend (create the bucket or directory tree).
    /// Idempotent; called once at startup.
    async fn ensure_ready(&self) -> Result<(), StorageError>;

    /// Whether an object exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Store-reported metadata for `key`, or `None` if the object is
    /// absent.
    async fn metadata(&self, key: &str) -> Result<Option<ObjectMetadata>, StorageError>;

    /// Delete the object at `key`. Returns `false` if there was nothing
    /// to delete.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Write an object directly. Used by the local backend's upload
    /// endpoint; the S3 backend supports it for server-side ingestion.
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), StorageError>;

    /// Issue a time-limited direct-upload credential for `key`.
    ///
    /// `max_size_bytes` is the per-kind limit; backends enforce it where
    /// the protocol allows and otherwise surface it to the client as an
    /// advisory field.
    async fn issue_upload_credential(
        &self,
        key: &str,
        content_type: &str,
        max_size_bytes: u64,
    ) -> Result<UploadCredential, StorageError>;

    /// Issue a signed, time-limited read URL for `key`.
    async fn issue_read_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;

    /// Unsigned public URL for `key`.
    fn public_url(&self, key: &str) -> String;
}
