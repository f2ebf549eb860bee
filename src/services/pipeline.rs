use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::models::{ImageRequest, PublishedImage};
use crate::services::fetcher::Fetcher;
use crate::services::publisher::Publisher;
use crate::services::source::Source;
use crate::services::storage::StorageService;
use crate::services::thumbnail_service::ThumbnailService;
use crate::utils::naming;
use crate::utils::scratch::ScratchFiles;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;

/// States of one invocation. Every failure goes straight to `Cleanup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Resolving,
    Fetching,
    Resizing,
    Uploading,
    Cleanup,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Resolving => "resolving",
            PipelineStage::Fetching => "fetching",
            PipelineStage::Resizing => "resizing",
            PipelineStage::Uploading => "uploading",
            PipelineStage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

/// fetch -> resize -> upload -> cleanup
#[derive(Clone)]
pub struct ImagePipeline {
    temp_dir: PathBuf,
    fetcher: Fetcher,
    thumbnails: ThumbnailService,
    publisher: Publisher,
}

impl ImagePipeline {
    pub fn new(
        temp_dir: impl Into<PathBuf>,
        fetcher: Fetcher,
        thumbnails: ThumbnailService,
        publisher: Publisher,
    ) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            fetcher,
            thumbnails,
            publisher,
        }
    }

    pub fn from_config(config: &AppConfig, storage: Arc<dyn StorageService>) -> anyhow::Result<Self> {
        Ok(Self::new(
            config.temp_dir.clone(),
            Fetcher::new(config.fetch_timeout)?,
            ThumbnailService::new(config.placeholder_size),
            Publisher::new(storage),
        ))
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn storage(&self) -> &Arc<dyn StorageService> {
        self.publisher.storage()
    }

    /// Runs one invocation to completion. Temporary files are removed before
    /// this returns, whatever the outcome.
    pub async fn run(&self, request: &ImageRequest) -> Result<PublishedImage, PipelineError> {
        let span = tracing::info_span!("publish_image", label = %request.label);
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(&self, request: &ImageRequest) -> Result<PublishedImage, PipelineError> {
        let started_at = Utc::now();

        tracing::debug!(stage = %PipelineStage::Resolving, "resolving source");
        let source = Source::parse(&request.source)?;
        if request.label.trim().is_empty() {
            return Err(PipelineError::Validation(
                "label should not be empty".to_string(),
            ));
        }
        let base_name = naming::base_name(&request.label, started_at);

        let mut scratch = ScratchFiles::new(&self.temp_dir);
        let outcome = self
            .process(&source, &base_name, started_at, &mut scratch)
            .await;

        tracing::debug!(stage = %PipelineStage::Cleanup, "removing {} file(s)", scratch.files().len());
        scratch.cleanup().await;

        match &outcome {
            Ok(published) => tracing::info!("✅ Published {}", published.image.path),
            Err(e) => tracing::error!(kind = e.kind(), "❌ Pipeline failed: {}", e),
        }
        outcome
    }

    async fn process(
        &self,
        source: &Source,
        base_name: &str,
        started_at: DateTime<Utc>,
        scratch: &mut ScratchFiles,
    ) -> Result<PublishedImage, PipelineError> {
        tracing::debug!(stage = %PipelineStage::Fetching, "fetching {}", base_name);
        let (asset, original) = self.fetcher.fetch(source, base_name, scratch).await?;

        tracing::debug!(stage = %PipelineStage::Resizing, "generating placeholder");
        let placeholder = self.thumbnails.generate(&original, &asset, scratch).await?;

        tracing::debug!(stage = %PipelineStage::Uploading, "uploading {}", asset.image_name());
        let pair = self
            .publisher
            .publish(started_at, &asset, &original, &placeholder)
            .await?;

        Ok(PublishedImage {
            image: pair.image.into(),
            placeholder: pair.placeholder.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(PipelineStage::Resolving.to_string(), "resolving");
        assert_eq!(PipelineStage::Cleanup.to_string(), "cleanup");
    }
}
