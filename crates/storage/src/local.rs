//! Filesystem-backed object store.
//!
//! Mirrors the S3 backend's contract over a local media directory:
//! objects live at `{media_root}/{key}`, read URLs are unsigned public
//! URLs under a static media base, and upload credentials point the
//! client at the API's own direct-upload endpoint.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::{ObjectMetadata, ObjectStore, StorageError, UploadCredential, UPLOAD_CREDENTIAL_TTL_SECS};

/// Subdirectories created under the media root at startup.
const ASSET_DIRS: &[&str] = &["assets/covers", "assets/models", "assets/pages"];

/// Local filesystem implementation of [`ObjectStore`].
pub struct LocalObjectStore {
    media_root: PathBuf,
    public_base_url: String,
    upload_url: String,
}

impl LocalObjectStore {
    /// Create a store rooted at `media_root`.
    ///
    /// `public_base_url` is where the media root is served from;
    /// `upload_url` is the endpoint upload credentials direct clients to.
    pub fn new(
        media_root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        upload_url: impl Into<String>,
    ) -> Self {
        let mut public_base_url = public_base_url.into();
        if !public_base_url.ends_with('/') {
            public_base_url.push('/');
        }
        Self {
            media_root: media_root.into(),
            public_base_url,
            upload_url: upload_url.into(),
        }
    }

    /// Resolve `key` under the media root, rejecting empty, absolute, or
    /// traversing keys so a malformed key can never escape the root.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.media_root.join(key))
    }
}

/// Reject keys that are empty, absolute, or contain `..` components.
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    let path = Path::new(key);
    let safe = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if safe {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Guess a content type from the key's file extension.
fn guess_content_type(key: &str) -> &'static str {
    match Path::new(key).extension().and_then(|e| e.to_str()) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("glb") => "model/gltf-binary",
        Some("gltf") => "model/gltf+json",
        _ => "application/octet-stream",
    }
}

#[async_trait::async_trait]
impl ObjectStore for LocalObjectStore {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        for dir in ASSET_DIRS {
            let path = self.media_root.join(dir);
            tokio::fs::create_dir_all(&path).await?;
        }
        tracing::debug!(root = %self.media_root.display(), "Local media directories ready");
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn metadata(&self, key: &str) -> Result<Option<ObjectMetadata>, StorageError> {
        let path = self.resolve(key)?;
        let meta = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Ok(None),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let last_modified = meta
            .modified()
            .ok()
            .map(chrono::DateTime::<chrono::Utc>::from);
        Ok(Some(ObjectMetadata {
            size_bytes: meta.len() as i64,
            content_type: guess_content_type(key).to_string(),
            last_modified,
        }))
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn put(&self, key: &str, _content_type: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn issue_upload_credential(
        &self,
        key: &str,
        content_type: &str,
        max_size_bytes: u64,
    ) -> Result<UploadCredential, StorageError> {
        validate_key(key)?;
        let mut fields = BTreeMap::new();
        fields.insert("key".to_string(), key.to_string());
        fields.insert("Content-Type".to_string(), content_type.to_string());
        fields.insert("max_size_bytes".to_string(), max_size_bytes.to_string());
        Ok(UploadCredential {
            url: self.upload_url.clone(),
            method: "PUT".to_string(),
            fields,
            key: key.to_string(),
            expires_in_secs: UPLOAD_CREDENTIAL_TTL_SECS,
        })
    }

    async fn issue_read_url(&self, key: &str, _ttl: Duration) -> Result<String, StorageError> {
        // Local files are served statically; the public URL is as signed
        // as it gets.
        validate_key(key)?;
        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}{}", self.public_base_url, key)
    }
}
