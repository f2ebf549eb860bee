use clap::Parser;
use dotenvy::dotenv;
use image_publisher::config::{AppConfig, StorageConfig};
use image_publisher::infrastructure::storage;
use image_publisher::models::ImageRequest;
use image_publisher::services::pipeline::ImagePipeline;
use serde_json::json;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Publish one image and its placeholder to the configured object store.
#[derive(Parser, Debug)]
#[command(name = "publish_image", version)]
struct Args {
    /// HTTP(S) URL or data:image/<fmt>;base64,... URI
    source: String,

    /// Label used to name the published objects
    #[arg(short, long)]
    label: String,

    /// Override TEMP_DIR
    #[arg(long, env = "TEMP_DIR")]
    temp_dir: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Logs go to stderr so stdout carries only the JSON result
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "publish_image=info,image_publisher=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(dir) = args.temp_dir {
        config.temp_dir = dir;
    }
    let storage_config = StorageConfig::from_env()?;

    info!("☁️  Connecting to storage...");
    storage::setup_temp_dir(&config.temp_dir).await?;
    let storage_service = storage::setup_storage(&storage_config).await;
    let pipeline = ImagePipeline::from_config(&config, storage_service)?;

    let request = ImageRequest::new(args.source, args.label);
    match pipeline.run(&request).await {
        Ok(published) => {
            println!("{}", serde_json::to_string_pretty(&published)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", json!({ "error": e.to_string() }));
            std::process::exit(1);
        }
    }
}
