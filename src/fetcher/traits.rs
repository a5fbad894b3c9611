//! The fetch-tool seam: trait plus asynchronous child-process handles

use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncRead;

/// Parameters for a download-mode invocation of the fetch tool
#[derive(Clone, Debug)]
pub struct DownloadSpec {
    /// Source video URL
    pub url: String,
    /// Exact path the merged output must be written to
    pub output_path: PathBuf,
    /// Format selection expression
    pub format: String,
    /// Target container format to merge into
    pub merge_output_format: String,
}

/// Handles to a running download process
///
/// The launcher does not wait synchronously; standard output, standard
/// error, and the exit status are each consumed asynchronously by the job
/// controller.
pub struct DownloadHandle {
    /// Incremental standard output carrying the progress lines
    pub stdout: Box<dyn AsyncRead + Send + Unpin>,
    /// Standard error, drained to the log
    pub stderr: Box<dyn AsyncRead + Send + Unpin>,
    /// Exit-status observation and termination control
    pub process: Box<dyn ProcessHandle>,
}

/// Control surface over a spawned child process
#[async_trait]
pub trait ProcessHandle: Send {
    /// Wait for the process to exit. `Ok(None)` means it was terminated by
    /// a signal.
    async fn wait(&mut self) -> std::io::Result<Option<i32>>;

    /// Terminate the process
    async fn kill(&mut self) -> std::io::Result<()>;
}

/// A media fetch tool that can retrieve metadata and download+merge streams
///
/// This is the seam between the job controller and the external binary;
/// tests drive the controller with a scripted implementation.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Retrieve the metadata document for a URL without downloading.
    ///
    /// The document contains at least a `title` field for supported sources.
    async fn video_info(&self, url: &str) -> Result<serde_json::Value>;

    /// Start a download+merge process configured per `spec`; returns
    /// without waiting.
    async fn spawn_download(&self, spec: &DownloadSpec) -> Result<DownloadHandle>;

    /// Short identifier for logs
    fn name(&self) -> &'static str;
}
