use crate::error::PipelineError;
use crate::models::{LocalFile, ResolvedAsset, UploadResult};
use crate::services::storage::StorageService;
use crate::utils::naming::object_key;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Uploads the original and its placeholder as one unit.
#[derive(Clone)]
pub struct Publisher {
    storage: Arc<dyn StorageService>,
}

/// Upload receipts for both objects of one invocation
#[derive(Debug, Clone)]
pub struct PublishedPair {
    pub image: UploadResult,
    pub placeholder: UploadResult,
}

impl Publisher {
    pub fn new(storage: Arc<dyn StorageService>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn StorageService> {
        &self.storage
    }

    /// Uploads both files concurrently under `{year}/{month}/` of
    /// `started_at`. If only one upload succeeds, that object is deleted
    /// again before the error is returned.
    pub async fn publish(
        &self,
        started_at: DateTime<Utc>,
        asset: &ResolvedAsset,
        original: &LocalFile,
        placeholder: &LocalFile,
    ) -> Result<PublishedPair, PipelineError> {
        let content_type = content_type_for(&asset.extension);
        let image_key = object_key(started_at, &asset.image_name());
        let placeholder_key = object_key(started_at, &asset.placeholder_name());

        let (image, thumb) = tokio::join!(
            self.upload(&image_key, original, &content_type),
            self.upload(&placeholder_key, placeholder, &content_type),
        );

        match (image, thumb) {
            (Ok(image), Ok(placeholder)) => Ok(PublishedPair { image, placeholder }),
            (Ok(orphan), Err(e)) | (Err(e), Ok(orphan)) => {
                self.rollback(&orphan).await;
                Err(e)
            }
            (Err(e), Err(other)) => {
                tracing::error!("❌ Both uploads failed, second error: {}", other);
                Err(e)
            }
        }
    }

    async fn upload(
        &self,
        key: &str,
        file: &LocalFile,
        content_type: &str,
    ) -> Result<UploadResult, PipelineError> {
        let etag = self
            .storage
            .upload_file(key, &file.path, content_type)
            .await
            .map_err(|e| PipelineError::Upload(format!("{}: {}", key, e)))?;

        tracing::debug!("☁️  Uploaded {} ({:?}) etag={}", key, file.role, etag);
        Ok(UploadResult {
            key: key.to_string(),
            etag,
        })
    }

    async fn rollback(&self, upload: &UploadResult) {
        tracing::warn!("↩️  Rolling back {} after partial upload failure", upload.key);
        if let Err(e) = self.storage.delete_file(&upload.key).await {
            tracing::error!("Failed to roll back {}: {}", upload.key, e);
        }
    }
}

/// MIME type for an image extension
pub fn content_type_for(extension: &str) -> String {
    match extension {
        "jpg" => "image/jpeg".to_string(),
        other => format!("image/{}", other),
    }
}
