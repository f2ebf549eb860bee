use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Input of one pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageRequest {
    /// HTTP(S) URL or `data:image/<fmt>;base64,...` URI
    pub source: String,
    /// Human readable label, used to build object names
    pub label: String,
}

impl ImageRequest {
    pub fn new(source: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub extension: String,
    pub base_name: String,
}

impl ResolvedAsset {
    pub fn image_name(&self) -> String {
        format!("{}.{}", self.base_name, self.extension)
    }

    pub fn placeholder_name(&self) -> String {
        format!("{}_placeholder.{}", self.base_name, self.extension)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Original,
    Placeholder,
}

/// A temporary file owned by a single invocation
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub path: PathBuf,
    pub role: FileRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub key: String,
    pub etag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PublishedObject {
    /// Object key prefixed with `/`
    pub path: String,
    pub etag: String,
}

impl From<UploadResult> for PublishedObject {
    fn from(upload: UploadResult) -> Self {
        Self {
            path: format!("/{}", upload.key),
            etag: upload.etag,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PublishedImage {
    pub image: PublishedObject,
    pub placeholder: PublishedObject,
}
