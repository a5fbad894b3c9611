//! Application state for the API server

use crate::config::Config;
use crate::service::VideoDownloader;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the downloader instance and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The main VideoDownloader instance
    pub downloader: Arc<VideoDownloader>,

    /// Configuration (read access)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(downloader: Arc<VideoDownloader>, config: Arc<Config>) -> Self {
        Self { downloader, config }
    }
}
