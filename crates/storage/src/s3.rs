//! S3-backed object store.
//!
//! Uses HEAD requests for existence/metadata, presigned PUT requests for
//! direct-upload credentials, and presigned GET requests for signed read
//! URLs. Works against AWS S3 or any compatible endpoint the ambient AWS
//! configuration points at.

use std::collections::BTreeMap;
use std::time::Duration;

use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;

use crate::{ObjectMetadata, ObjectStore, StorageError, UploadCredential, UPLOAD_CREDENTIAL_TTL_SECS};

/// S3 implementation of [`ObjectStore`].
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
    public_domain: Option<String>,
}

impl S3ObjectStore {
    pub fn new(
        client: Client,
        bucket: impl Into<String>,
        region: impl Into<String>,
        public_domain: Option<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            region: region.into(),
            public_domain,
        }
    }

    fn backend_err(err: impl std::fmt::Display) -> StorageError {
        StorageError::Backend(err.to_string())
    }
}

/// Convert an S3 timestamp to a UTC chrono timestamp.
fn to_chrono(dt: &aws_smithy_types::DateTime) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn ensure_ready(&self) -> Result<(), StorageError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                tracing::debug!(bucket = %self.bucket, "Bucket exists");
                return Ok(());
            }
            Err(SdkError::ServiceError(ref svc)) if svc.err().is_not_found() => {}
            Err(err) => return Err(Self::backend_err(err)),
        }

        // us-east-1 rejects an explicit location constraint.
        let mut create = self.client.create_bucket().bucket(&self.bucket);
        if self.region != "us-east-1" {
            create = create.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        create.send().await.map_err(Self::backend_err)?;
        tracing::info!(bucket = %self.bucket, region = %self.region, "Created bucket");
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(ref svc)) if svc.err().is_not_found() => Ok(false),
            Err(err) => Err(Self::backend_err(err)),
        }
    }

    async fn metadata(&self, key: &str) -> Result<Option<ObjectMetadata>, StorageError> {
        let head = match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(head) => head,
            Err(SdkError::ServiceError(ref svc)) if svc.err().is_not_found() => return Ok(None),
            Err(err) => return Err(Self::backend_err(err)),
        };
        Ok(Some(ObjectMetadata {
            size_bytes: head.content_length().unwrap_or(0),
            content_type: head.content_type().unwrap_or_default().to_string(),
            last_modified: head.last_modified().and_then(to_chrono),
        }))
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        // S3 DeleteObject succeeds for missing keys as well.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::backend_err)?;
        Ok(true)
    }

    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(Self::backend_err)?;
        Ok(())
    }

    async fn issue_upload_credential(
        &self,
        key: &str,
        content_type: &str,
        max_size_bytes: u64,
    ) -> Result<UploadCredential, StorageError> {
        // A presigned PUT cannot carry a size condition the way a
        // presigned POST policy can; the limit travels as an advisory
        // field and is re-checked at confirmation time.
        let presigning = PresigningConfig::expires_in(Duration::from_secs(
            UPLOAD_CREDENTIAL_TTL_SECS,
        ))
        .map_err(Self::backend_err)?;
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(Self::backend_err)?;

        let mut fields = BTreeMap::new();
        fields.insert("Content-Type".to_string(), content_type.to_string());
        fields.insert("max_size_bytes".to_string(), max_size_bytes.to_string());
        Ok(UploadCredential {
            url: presigned.uri().to_string(),
            method: presigned.method().to_string(),
            fields,
            key: key.to_string(),
            expires_in_secs: UPLOAD_CREDENTIAL_TTL_SECS,
        })
    }

    async fn issue_read_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(ttl).map_err(Self::backend_err)?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(Self::backend_err)?;
        Ok(presigned.uri().to_string())
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_domain {
            Some(domain) => format!("https://{domain}/{key}"),
            None => format!(
                "https://{bucket}.s3.{region}.amazonaws.com/{key}",
                bucket = self.bucket,
                region = self.region
            ),
        }
    }
}
