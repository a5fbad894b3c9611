//! Configuration types for video-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

/// Download behavior configuration (directories, format selection, naming)
///
/// Groups settings related to where output lands and how the fetch tool
/// selects and merges streams. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Preferred downloads directory (default: the user's Downloads folder)
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Local fallback used when the preferred directory is not writable
    /// (default: "./downloads")
    #[serde(default = "default_fallback_dir")]
    pub fallback_dir: PathBuf,

    /// Format selection expression passed to the fetch tool: best mp4
    /// video+audio pair, best combined stream as fallback
    #[serde(default = "default_format")]
    pub format: String,

    /// Container format the fetch tool merges into (default: "mp4")
    #[serde(default = "default_merge_output_format")]
    pub merge_output_format: String,

    /// Title used when metadata retrieval fails (default: "video")
    #[serde(default = "default_title")]
    pub default_title: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            fallback_dir: default_fallback_dir(),
            format: default_format(),
            merge_output_format: default_merge_output_format(),
            default_title: default_title(),
        }
    }
}

impl DownloadConfig {
    /// Resolve the downloads directory once at startup.
    ///
    /// Tries the preferred location first (explicit `download_dir`, else the
    /// user's Downloads folder), then falls back to `fallback_dir`. Each
    /// candidate must be creatable and writable; the winner is passed by
    /// reference into every component that needs it.
    pub fn resolve_downloads_dir(&self) -> Result<PathBuf> {
        let preferred = self.download_dir.clone().or_else(user_downloads_dir);

        if let Some(dir) = preferred {
            match ensure_writable(&dir) {
                Ok(()) => {
                    tracing::info!(dir = %dir.display(), "downloads directory set");
                    return Ok(dir);
                }
                Err(e) => {
                    tracing::warn!(
                        dir = %dir.display(),
                        error = %e,
                        "preferred downloads directory unusable, falling back"
                    );
                }
            }
        }

        ensure_writable(&self.fallback_dir).map_err(|e| Error::Config {
            message: format!(
                "fallback downloads directory {} is not writable: {}",
                self.fallback_dir.display(),
                e
            ),
            key: Some("fallback_dir".to_string()),
        })?;
        tracing::info!(dir = %self.fallback_dir.display(), "using local downloads directory");
        Ok(self.fallback_dir.clone())
    }
}

/// The user's Downloads folder, when a home directory is known
fn user_downloads_dir() -> Option<PathBuf> {
    std::env::home_dir().map(|home| home.join("Downloads"))
}

/// Verify a directory exists (creating it if needed) and accepts writes
fn ensure_writable(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let probe = dir.join(".video-dl-write-probe");
    std::fs::write(&probe, b"")?;
    std::fs::remove_file(&probe)
}

/// External tool paths (yt-dlp, ffmpeg)
///
/// Groups settings for the external binaries the service drives.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Path to the ffmpeg executable wired into the fetch tool for merging
    /// (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not
    /// set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            ffmpeg_path: None,
            search_path: true,
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:3000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins; "*" allows any origin (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve interactive Swagger UI documentation at /swagger-ui
    /// (default: false)
    #[serde(default)]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
        }
    }
}

/// Main configuration for the download service
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) — directories, format selection, naming
/// - [`tools`](ToolsConfig) — external binary paths
/// - [`api`](ApiConfig) — REST server settings
///
/// The download and tools sub-configs are flattened for serialization, so
/// the JSON format stays flat (no nesting).
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings (directories, format selection, naming)
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

fn default_fallback_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_format() -> String {
    "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string()
}

fn default_merge_output_format() -> String {
    "mp4".to_string()
}

fn default_title() -> String {
    "video".to_string()
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}
