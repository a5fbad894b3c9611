//! video-dl server binary

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use video_dl::{Config, VideoDownloader};

/// Self-hosted video download service with live progress streaming
#[derive(Debug, Parser)]
#[command(name = "video-dl", version, about)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind the API server to (overrides the config file)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Downloads directory (overrides the config file)
    #[arg(long)]
    downloads_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<Config>(&raw)?
        }
        None => Config::default(),
    };

    if let Some(bind) = cli.bind {
        config.api.bind_address = bind;
    }
    if let Some(dir) = cli.downloads_dir {
        config.download.download_dir = Some(dir);
    }

    let downloader = Arc::new(VideoDownloader::new(config.clone())?);
    let config = Arc::new(config);

    video_dl::api::start_api_server(downloader, config).await?;

    Ok(())
}
