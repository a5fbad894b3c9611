//! # video-dl
//!
//! Self-hosted video download service with live progress streaming.
//!
//! A client submits a video URL; the service spawns the external fetch tool
//! (yt-dlp), relays its download progress as a line-delimited JSON event
//! stream over a single chunked HTTP response, and finally hands off the
//! merged output file through a short-lived, single-use download link.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - the REST surface is a thin layer over [`VideoDownloader`]
//! - **Event-driven** - one channel per job, no polling; the controller
//!   reacts to process output and exit events
//! - **Explicit configuration** - directories and tool paths are resolved
//!   once at startup and passed by reference, no ambient lookups
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use video_dl::{Config, VideoDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let downloader = Arc::new(VideoDownloader::new(config.clone())?);
//!
//!     // Serve the REST API (blocks until shutdown)
//!     video_dl::api::start_api_server(downloader, Arc::new(config)).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Fetch-tool integration (metadata, process launching, progress parsing)
pub mod fetcher;
/// Job lifecycle controller
mod job;
/// Core service implementation
pub mod service;
/// Staged-file handoff
pub mod staging;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{ApiConfig, Config, DownloadConfig, ToolsConfig};
pub use error::{ApiError, Error, ErrorDetail, FetchError, Result, ToHttpStatus};
pub use fetcher::{DownloadHandle, DownloadSpec, MediaFetcher, ProcessHandle, YtDlpFetcher};
pub use service::VideoDownloader;
pub use staging::{FileStaging, StagedFile};
pub use types::{DownloadRequest, JobId, StagedEntry, StreamEvent};
