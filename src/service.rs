//! The central service object wiring config, fetcher, staging and jobs

use crate::api;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{MediaFetcher, YtDlpFetcher};
use crate::job::{self, JobContext};
use crate::staging::FileStaging;
use crate::types::{JobId, StreamEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of each job's event channel; events are small and drained
/// continuously by the response body.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Core download service
///
/// Accepts jobs, relays their lifecycle events, and stages produced files
/// for single-use retrieval. The REST surface in [`crate::api`] is a thin
/// layer over this type.
pub struct VideoDownloader {
    config: Arc<Config>,
    downloads_dir: PathBuf,
    fetcher: Arc<dyn MediaFetcher>,
    staging: Arc<FileStaging>,
}

impl VideoDownloader {
    /// Create a service from config, discovering the fetch-tool binaries
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Arc::new(YtDlpFetcher::from_config(&config.tools)?);
        Self::with_fetcher(config, fetcher)
    }

    /// Create a service with a custom [`MediaFetcher`] implementation
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn MediaFetcher>) -> Result<Self> {
        let downloads_dir = config.download.resolve_downloads_dir()?;
        Ok(Self {
            config: Arc::new(config),
            downloads_dir,
            fetcher,
            staging: Arc::new(FileStaging::new()),
        })
    }

    /// Accept a download job and return its ordered event stream.
    ///
    /// The receiver yields zero or more progress events followed by exactly
    /// one terminal event, after which it closes. Dropping the receiver
    /// aborts the job: the child process is killed and partial output
    /// removed.
    pub fn start_job(&self, url: String) -> (JobId, mpsc::Receiver<StreamEvent>) {
        let id = JobId::generate();
        let output_path = self.downloads_dir.join(format!(
            "{}.{}",
            id, self.config.download.merge_output_format
        ));

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let ctx = JobContext {
            id: id.clone(),
            url,
            output_path,
            fetcher: self.fetcher.clone(),
            config: self.config.clone(),
            staging: self.staging.clone(),
        };
        tokio::spawn(job::run(ctx, tx));

        (id, rx)
    }

    /// Retrieve the metadata document for a URL without downloading
    pub async fn video_info(&self, url: &str) -> Result<serde_json::Value> {
        self.fetcher.video_info(url).await
    }

    /// Staged files awaiting retrieval
    pub fn staging(&self) -> &FileStaging {
        &self.staging
    }

    /// The directory all job output is written to
    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    /// Service configuration
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Spawn the REST API server on the configured bind address
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();
        tokio::spawn(async move { api::start_api_server(downloader, config).await })
    }
}
