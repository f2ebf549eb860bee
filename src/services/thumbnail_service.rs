use crate::error::PipelineError;
use crate::models::{FileRole, LocalFile, ResolvedAsset};
use crate::utils::scratch::ScratchFiles;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// Default placeholder bounding box (width and height)
pub const PLACEHOLDER_SIZE: u32 = 16;

/// Generates the low resolution placeholder that is published next to the
/// original image.
#[derive(Debug, Clone)]
pub struct ThumbnailService {
    size: u32,
}

impl Default for ThumbnailService {
    fn default() -> Self {
        Self::new(PLACEHOLDER_SIZE)
    }
}

impl ThumbnailService {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// Writes `{base_name}_placeholder.{extension}` next to the original.
    /// Decoding and resizing run on the blocking pool.
    pub async fn generate(
        &self,
        original: &LocalFile,
        asset: &ResolvedAsset,
        scratch: &mut ScratchFiles,
    ) -> Result<LocalFile, PipelineError> {
        let placeholder = scratch.track(&asset.placeholder_name(), FileRole::Placeholder);

        let source = original.path.clone();
        let target = placeholder.path.clone();
        let size = self.size;
        let (width, height) =
            tokio::task::spawn_blocking(move || render_placeholder(&source, &target, size))
                .await
                .map_err(|e| PipelineError::Resize(format!("resize task failed: {}", e)))??;

        tracing::debug!(
            "🖼️  Placeholder {}x{} written to {}",
            width,
            height,
            placeholder.path.display()
        );
        Ok(placeholder)
    }
}

/// Resizes `source` to fit a `size`x`size` box, preserving aspect ratio, and
/// encodes it in the format implied by `target`'s extension.
pub fn render_placeholder(source: &Path, target: &Path, size: u32) -> Result<(u32, u32), PipelineError> {
    let data = std::fs::read(source).map_err(|e| {
        PipelineError::Resize(format!("failed to read {}: {}", source.display(), e))
    })?;

    let img = image::load_from_memory(&data)
        .map_err(|e| PipelineError::Resize(format!("failed to load image: {}", e)))?;

    let format = target
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .or_else(|| image::guess_format(&data).ok())
        .ok_or_else(|| PipelineError::Resize("unknown placeholder format".to_string()))?;

    let thumbnail = img.resize(size, size, FilterType::Triangle);
    let dimensions = (thumbnail.width(), thumbnail.height());

    let bytes = encode(&thumbnail, format)?;
    std::fs::write(target, bytes).map_err(|e| {
        PipelineError::Resize(format!("failed to write {}: {}", target.display(), e))
    })?;

    Ok(dimensions)
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, PipelineError> {
    // JPEG has no alpha channel; the other encoders only take 8-bit buffers
    let img = match (format, img.color()) {
        (ImageFormat::Jpeg, _) => DynamicImage::ImageRgb8(img.to_rgb8()),
        (_, image::ColorType::Rgba16 | image::ColorType::La16 | image::ColorType::Rgba32F) => {
            DynamicImage::ImageRgba8(img.to_rgba8())
        }
        (_, image::ColorType::Rgb16 | image::ColorType::L16 | image::ColorType::Rgb32F) => {
            DynamicImage::ImageRgb8(img.to_rgb8())
        }
        _ => img.clone(),
    };

    let mut out = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut out), format)
        .map_err(|e| PipelineError::Resize(format!("failed to encode placeholder: {}", e)))?;
    Ok(out)
}
