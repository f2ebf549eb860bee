use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the image pipeline
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory for intermediate files (default: "temp")
    pub temp_dir: PathBuf,

    /// Bounding box edge of the placeholder in pixels (default: 16)
    pub placeholder_size: u32,

    /// Optional timeout for remote fetches (default: none)
    pub fetch_timeout: Option<Duration>,

    /// HTTP port (default: 3000)
    pub port: u16,

    /// Maximum request body in bytes, bounds inline data URIs (default: 20 MB)
    pub max_body_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from("temp"),
            placeholder_size: 16,
            fetch_timeout: None,
            port: 3000,
            max_body_size: 20 * 1024 * 1024, // 20 MB
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            temp_dir: env::var("TEMP_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.temp_dir),

            placeholder_size: env::var("PLACEHOLDER_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size: &u32| *size > 0)
                .unwrap_or(default.placeholder_size),

            fetch_timeout: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| parse_timeout(&v))
                .or(default.fetch_timeout),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_body_size),
        }
    }
}

/// Connection settings for the S3-compatible object store
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,

    /// Signing region (default: "us-east-1")
    pub region: String,

    /// Path-style addressing, needed by MinIO (default: true)
    pub force_path_style: bool,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    /// Endpoint, bucket and both keys are required.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            endpoint: required("SPACES_BUCKET_ENDPOINT")?,
            bucket: required("SPACES_BUCKET_NAME")?,
            access_key_id: required("SPACES_ACCESS_KEY_ID")?,
            secret_access_key: required("SPACES_ACCESS_SECRET_KEY")?,
            region: env::var("SPACES_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            force_path_style: env::var("SPACES_FORCE_PATH_STYLE")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        })
    }

    /// Endpoint with a scheme, as the AWS SDK expects one
    pub fn endpoint_url(&self) -> String {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        }
    }
}

/// Whole seconds; zero or garbage means "not set"
fn parse_timeout(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse()
        .ok()
        .filter(|secs: &u64| *secs > 0)
        .map(Duration::from_secs)
}

fn required(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{} must be set", name))
}
