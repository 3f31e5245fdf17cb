//! S3-compatible storage client
//!
//! Wraps the AWS SDK for S3-compatible storage access. Buckets come from the
//! request, so one client serves every bucket the credentials can reach.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};
use chrono::DateTime;

use crate::config::StorageConfig;
use crate::error::StorageError;

use super::location::ObjectLocation;
use super::store::ObjectStore;
use super::types::ObjectMetadata;

const DEFAULT_REGION: &str = "us-east-1";

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create a new S3 client from configuration
    ///
    /// Static credentials are used when both keys are configured, otherwise
    /// the SDK's default provider chain applies.
    pub async fn new(config: &StorageConfig) -> Self {
        let region = config
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "pdf-ocr-server",
            ));
        }

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            // Required for MinIO and other S3-compatible services
            .force_path_style(config.endpoint.is_some())
            .build();

        Self {
            client: Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn fetch(&self, location: &ObjectLocation, dest: &Path) -> Result<(), StorageError> {
        tracing::debug!("GET {} -> {}", location, dest.display());

        let response = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| map_sdk_error("get object", &location.key, DisplayErrorContext(&e).to_string()))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to read object body: {}", e)))?
            .into_bytes();

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &data).await?;

        tracing::info!("Downloaded {} ({} bytes)", location, data.len());
        Ok(())
    }

    async fn store(&self, src: &Path, location: &ObjectLocation) -> Result<(), StorageError> {
        tracing::debug!("PUT {} -> {}", src.display(), location);

        let body = ByteStream::from_path(src)
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to read {}: {}", src.display(), e)))?;

        self.client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .content_type("application/pdf")
            .body(body)
            .send()
            .await
            .map_err(|e| map_sdk_error("put object", &location.key, DisplayErrorContext(&e).to_string()))?;

        tracing::info!("Uploaded {}", location);
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectMetadata>, StorageError> {
        let mut all_objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .max_keys(1000);

            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| map_sdk_error("list objects", prefix, DisplayErrorContext(&e).to_string()))?;

            all_objects.extend(response.contents().iter().map(|obj| ObjectMetadata {
                key: obj.key().unwrap_or_default().to_string(),
                size: obj.size().unwrap_or(0),
                last_modified: obj
                    .last_modified()
                    .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())),
                etag: obj.e_tag().map(|s| s.to_string()),
            }));

            if !response.is_truncated().unwrap_or(false) {
                break;
            }

            continuation_token = response.next_continuation_token().map(|s| s.to_string());
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(all_objects)
    }
}

/// Classify an SDK failure from its rendered error chain
fn map_sdk_error(action: &str, key: &str, message: String) -> StorageError {
    if message.contains("NoSuchKey") || message.contains("NotFound") || message.contains("404") {
        StorageError::ObjectNotFound(key.to_string())
    } else if message.contains("AccessDenied") || message.contains("403") {
        StorageError::AccessDenied(key.to_string())
    } else {
        StorageError::SdkError(format!("Failed to {} {}: {}", action, key, message))
    }
}
