use crate::error::PipelineError;
use crate::models::{FileRole, LocalFile, ResolvedAsset};
use crate::services::source::{Source, extension_from_content_type};
use crate::utils::scratch::ScratchFiles;
use anyhow::Result;
use base64::Engine;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Standard alphabet, padding optional
const DATA_URI_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Materializes a [`Source`] into a temporary file.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Writes the image to `{scratch dir}/{base_name}.{extension}`.
    ///
    /// The destination is registered in `scratch` before it is created, so a
    /// half-written file is still removed by the caller's cleanup.
    pub async fn fetch(
        &self,
        source: &Source,
        base_name: &str,
        scratch: &mut ScratchFiles,
    ) -> Result<(ResolvedAsset, LocalFile), PipelineError> {
        match source {
            Source::DataUri { extension, payload } => {
                let asset = resolved(base_name, extension)?;
                let file = write_data_uri(payload, &asset, scratch).await?;
                Ok((asset, file))
            }
            Source::Remote(url) => self.download(url, base_name, scratch).await,
        }
    }

    async fn download(
        &self,
        url: &Url,
        base_name: &str,
        scratch: &mut ScratchFiles,
    ) -> Result<(ResolvedAsset, LocalFile), PipelineError> {
        tracing::debug!("🌐 GET {}", url);
        let mut response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch(format!("{} responded with HTTP {}", url, status)));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let extension = extension_from_content_type(content_type)?;
        let asset = resolved(base_name, &extension)?;

        let file = scratch.track(&asset.image_name(), FileRole::Original);
        let mut out = tokio::fs::File::create(&file.path)
            .await
            .map_err(|e| write_failed(&file, e))?;

        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk)
                .await
                .map_err(|e| write_failed(&file, e))?;
            written += chunk.len();
        }
        out.flush().await.map_err(|e| write_failed(&file, e))?;

        tracing::debug!("📥 Streamed {} bytes into {}", written, file.path.display());
        Ok((asset, file))
    }
}

fn resolved(base_name: &str, extension: &str) -> Result<ResolvedAsset, PipelineError> {
    if extension.is_empty() {
        return Err(PipelineError::Validation(
            "There was no file extension specified".to_string(),
        ));
    }
    Ok(ResolvedAsset {
        extension: extension.to_string(),
        base_name: base_name.to_string(),
    })
}

fn write_failed(file: &LocalFile, e: std::io::Error) -> PipelineError {
    PipelineError::Fetch(format!("failed to write {}: {}", file.path.display(), e))
}

/// Decodes the payload in memory first, so malformed input never touches disk.
async fn write_data_uri(
    payload: &str,
    asset: &ResolvedAsset,
    scratch: &mut ScratchFiles,
) -> Result<LocalFile, PipelineError> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = DATA_URI_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| PipelineError::Decode(format!("invalid base64 payload: {}", e)))?;
    if bytes.is_empty() {
        return Err(PipelineError::Decode("base64 payload is empty".to_string()));
    }

    let file = scratch.track(&asset.image_name(), FileRole::Original);
    tokio::fs::write(&file.path, &bytes).await.map_err(|e| {
        PipelineError::Decode(format!("failed to write {}: {}", file.path.display(), e))
    })?;

    tracing::debug!("📝 Decoded {} bytes into {}", bytes.len(), file.path.display());
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_data_uri_is_decoded_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut scratch = ScratchFiles::new(dir.path());
        let fetcher = Fetcher::new(None).unwrap();

        let source = Source::parse("data:image/gif;base64,aGVsbG8gd29ybGQ=").unwrap();
        let (asset, file) = fetcher.fetch(&source, "greeting_1_x", &mut scratch).await.unwrap();

        assert_eq!(asset.extension, "gif");
        assert_eq!(file.role, FileRole::Original);
        assert_eq!(file.path, dir.path().join("greeting_1_x.gif"));
        assert_eq!(tokio::fs::read(&file.path).await.unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_unpadded_payload_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let mut scratch = ScratchFiles::new(dir.path());
        let fetcher = Fetcher::new(None).unwrap();

        let source = Source::parse("data:image/png;base64,aGVsbG8gd29ybGQ").unwrap();
        let (_, file) = fetcher.fetch(&source, "unpadded", &mut scratch).await.unwrap();

        assert_eq!(tokio::fs::read(&file.path).await.unwrap(), b"hello world");
    }

    #[tokio::test]
    async fn test_malformed_base64_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut scratch = ScratchFiles::new(dir.path());
        let fetcher = Fetcher::new(None).unwrap();

        let source = Source::parse("data:image/png;base64,@@not*base64@@").unwrap();
        let err = fetcher.fetch(&source, "broken", &mut scratch).await.unwrap_err();

        assert!(matches!(err, PipelineError::Decode(_)), "got {:?}", err);
        assert!(scratch.files().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut scratch = ScratchFiles::new(dir.path().join("missing"));
        let fetcher = Fetcher::new(None).unwrap();

        let source = Source::parse("data:image/png;base64,aGVsbG8=").unwrap();
        let err = fetcher.fetch(&source, "nowhere", &mut scratch).await.unwrap_err();

        assert!(matches!(err, PipelineError::Decode(_)), "got {:?}", err);
    }
}
