//! Storage configuration and backend construction.
//!
//! The backend is chosen by configuration, not conditional imports: the
//! server builds one [`ObjectStore`] at startup and hands it to whatever
//! needs it.

use std::path::PathBuf;
use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;

use crate::local::LocalObjectStore;
use crate::s3::S3ObjectStore;
use crate::{ObjectStore, StorageError};

/// Which object-store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    Local,
    S3,
}

impl StorageBackendKind {
    /// Parse from the `STORAGE_BACKEND` setting.
    pub fn from_name(name: &str) -> Result<Self, StorageError> {
        match name {
            "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => Err(StorageError::Backend(format!(
                "Unknown storage backend '{other}'. Must be one of: local, s3"
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::S3 => "s3",
        }
    }
}

/// Object-store configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backend selector (default: `local`).
    pub backend: StorageBackendKind,
    /// Local backend: media directory root (default: `./media`).
    pub media_root: PathBuf,
    /// Local backend: base URL the media root is served from
    /// (default: `http://localhost:8000/media/`).
    pub media_base_url: String,
    /// Local backend: direct-upload endpoint handed out in upload
    /// credentials (default: `/api/v1/assets/upload`).
    pub upload_url: String,
    /// S3 backend: bucket name (default: `lectern-assets`).
    pub s3_bucket: String,
    /// S3 backend: region (default: `us-east-1`).
    pub s3_region: String,
    /// S3 backend: optional custom domain for public URLs.
    pub s3_public_domain: Option<String>,
}

impl StorageConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                        |
    /// |--------------------|--------------------------------|
    /// | `STORAGE_BACKEND`  | `local`                        |
    /// | `MEDIA_ROOT`       | `./media`                      |
    /// | `MEDIA_BASE_URL`   | `http://localhost:8000/media/` |
    /// | `UPLOAD_URL`       | `/api/v1/assets/upload`        |
    /// | `S3_BUCKET`        | `lectern-assets`               |
    /// | `S3_REGION`        | `us-east-1`                    |
    /// | `S3_PUBLIC_DOMAIN` | unset                          |
    pub fn from_env() -> Self {
        let backend_name =
            std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".into());
        let backend = StorageBackendKind::from_name(&backend_name)
            .unwrap_or_else(|e| panic!("Invalid STORAGE_BACKEND: {e}"));

        Self {
            backend,
            media_root: std::env::var("MEDIA_ROOT")
                .unwrap_or_else(|_| "./media".into())
                .into(),
            media_base_url: std::env::var("MEDIA_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/media/".into()),
            upload_url: std::env::var("UPLOAD_URL")
                .unwrap_or_else(|_| "/api/v1/assets/upload".into()),
            s3_bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "lectern-assets".into()),
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            s3_public_domain: std::env::var("S3_PUBLIC_DOMAIN").ok(),
        }
    }
}

/// Construct the configured [`ObjectStore`].
pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackendKind::Local => {
            let store = LocalObjectStore::new(
                config.media_root.clone(),
                config.media_base_url.clone(),
                config.upload_url.clone(),
            );
            Ok(Arc::new(store))
        }
        StorageBackendKind::S3 => {
            let aws_config = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(config.s3_region.clone()))
                .load()
                .await;
            let client = Client::new(&aws_config);
            let store = S3ObjectStore::new(
                client,
                config.s3_bucket.clone(),
                config.s3_region.clone(),
                config.s3_public_domain.clone(),
            );
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_from_name() {
        assert_eq!(
            StorageBackendKind::from_name("local").unwrap(),
            StorageBackendKind::Local
        );
        assert_eq!(
            StorageBackendKind::from_name("s3").unwrap(),
            StorageBackendKind::S3
        );
        assert!(StorageBackendKind::from_name("ftp").is_err());
    }

    #[test]
    fn backend_kind_names() {
        assert_eq!(StorageBackendKind::Local.name(), "local");
        assert_eq!(StorageBackendKind::S3.name(), "s3");
    }
}
