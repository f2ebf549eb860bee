#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{StatusCode, header},
    response::Response,
    routing::get,
};
use base64::Engine;
use image::{ImageFormat, Rgba, RgbaImage};
use image_publisher::services::fetcher::Fetcher;
use image_publisher::services::pipeline::ImagePipeline;
use image_publisher::services::publisher::Publisher;
use image_publisher::services::storage::StorageService;
use image_publisher::services::thumbnail_service::ThumbnailService;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

type KeyPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Object store double that keeps objects in memory.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_when: Option<KeyPredicate>,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Uploads whose key matches `predicate` fail
    pub fn failing_when(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            objects: Mutex::new(HashMap::new()),
            fail_when: Some(Box::new(predicate)),
        })
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl StorageService for MemoryStorage {
    async fn upload_file(&self, key: &str, path: &Path, _content_type: &str) -> Result<String> {
        if self.fail_when.as_ref().is_some_and(|fail| fail(key)) {
            return Err(anyhow!("injected failure for {}", key));
        }
        let data = tokio::fs::read(path).await?;
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let etag = format!("\"{:016x}\"", hasher.finish());
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(etag)
    }

    async fn delete_file(&self, key: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn get_file(&self, key: &str) -> Result<Vec<u8>> {
        self.get(key).ok_or_else(|| anyhow!("no such key: {}", key))
    }

    async fn file_exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 90, 255])
    });
    let mut out = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

pub fn png_data_uri(width: u32, height: u32) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes(width, height))
    )
}

pub fn pipeline(temp_dir: &Path, storage: Arc<dyn StorageService>) -> ImagePipeline {
    pipeline_with_client(temp_dir, storage, reqwest::Client::builder())
}

pub fn pipeline_with_timeout(
    temp_dir: &Path,
    storage: Arc<dyn StorageService>,
    timeout: Duration,
) -> ImagePipeline {
    pipeline_with_client(temp_dir, storage, reqwest::Client::builder().timeout(timeout))
}

fn pipeline_with_client(
    temp_dir: &Path,
    storage: Arc<dyn StorageService>,
    builder: reqwest::ClientBuilder,
) -> ImagePipeline {
    ImagePipeline::new(
        temp_dir,
        // the upstream is always local; keep proxies from the environment out of it
        Fetcher::with_client(builder.no_proxy().build().unwrap()),
        ThumbnailService::default(),
        Publisher::new(storage),
    )
}

/// Number of entries left in `dir`
pub fn leftover_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

/// Local upstream serving fixtures; returns its base URL.
///
/// - `/photo.png`: 64x32 PNG
/// - `/untyped`: PNG bytes without a Content-Type
/// - `/page`: an HTML page
/// - `/junk.png`: `image/png` that is not an image
/// - `/missing`: 404
pub async fn spawn_upstream(photo: Vec<u8>) -> String {
    let photo = Arc::new(photo);
    let typed = photo.clone();
    let untyped = photo.clone();

    let app = Router::new()
        .route(
            "/photo.png",
            get(move || {
                let body = typed.clone();
                async move {
                    Response::builder()
                        .header(header::CONTENT_TYPE, "image/png")
                        .body(Body::from(body.as_ref().clone()))
                        .unwrap()
                }
            }),
        )
        .route(
            "/untyped",
            get(move || {
                let body = untyped.clone();
                async move { Response::new(Body::from(body.as_ref().clone())) }
            }),
        )
        .route(
            "/page",
            get(|| async {
                Response::builder()
                    .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
                    .body(Body::from("<html></html>"))
                    .unwrap()
            }),
        )
        .route(
            "/junk.png",
            get(|| async {
                Response::builder()
                    .header(header::CONTENT_TYPE, "image/png")
                    .body(Body::from("this is not a png"))
                    .unwrap()
            }),
        )
        .route(
            "/missing",
            get(|| async {
                Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .header(header::CONTENT_TYPE, "image/png")
                    .body(Body::empty())
                    .unwrap()
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// How a raw upstream misbehaves after sending a 200 `image/png` head
#[derive(Debug, Clone, Copy)]
pub enum BrokenBody {
    /// Announces 100000 bytes, sends 5000, then closes the connection
    Truncated,
    /// Sends 5000 bytes of the body, then goes silent
    Stalled,
}

/// Raw TCP upstream for failures that a well-behaved server cannot produce.
/// Returns the URL of the image.
pub async fn spawn_broken_upstream(mode: BrokenBody) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;

                let head = "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 100000\r\n\r\n";
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&[0x42; 5000]).await;
                let _ = socket.flush().await;

                if let BrokenBody::Stalled = mode {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
            });
        }
    });

    format!("http://{}/photo.png", addr)
}
