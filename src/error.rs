use std::path::PathBuf;
use thiserror::Error;

/// Terminal failure of one pipeline invocation. Nothing is published when
/// this is returned.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Resize error: {0}")]
    Resize(String),

    #[error("Upload error: {0}")]
    Upload(String),
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::Decode(_) => "decode",
            PipelineError::Fetch(_) => "fetch",
            PipelineError::Resize(_) => "resize",
            PipelineError::Upload(_) => "upload",
        }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::Fetch(e.to_string())
    }
}

/// Failure to remove a temporary file. Logged, never returned to callers.
#[derive(Error, Debug)]
#[error("failed to remove {}: {source}", path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}
