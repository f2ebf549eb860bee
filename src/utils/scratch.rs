use crate::error::CleanupError;
use crate::models::{FileRole, LocalFile};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Temporary files created by one pipeline invocation.
///
/// Paths are registered before the file is created so that partially
/// written files are removed too.
#[derive(Debug)]
pub struct ScratchFiles {
    dir: PathBuf,
    files: Vec<LocalFile>,
}

impl ScratchFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
        }
    }

    /// Reserve `{dir}/{file_name}` for `role` and return the local file.
    pub fn track(&mut self, file_name: &str, role: FileRole) -> LocalFile {
        let file = LocalFile {
            path: self.dir.join(file_name),
            role,
        };
        self.files.push(file.clone());
        file
    }

    pub fn files(&self) -> &[LocalFile] {
        &self.files
    }

    /// Removes every tracked file. A file that was never created is not an
    /// error; any other failure is logged and skipped.
    pub async fn cleanup(self) {
        for file in self.files {
            match remove(&file.path).await {
                Ok(()) => tracing::debug!("🧹 Removed {}", file.path.display()),
                Err(e) => tracing::warn!("⚠️  Cleanup failed: {}", e),
            }
        }
    }
}

async fn remove(path: &Path) -> Result<(), CleanupError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CleanupError {
            path: path.to_path_buf(),
            source,
        }),
    }
}
