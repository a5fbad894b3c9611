//! Scripted fetcher for driving the job controller deterministically in tests

use super::traits::{DownloadHandle, DownloadSpec, MediaFetcher, ProcessHandle};
use crate::error::{Error, FetchError, Result};
use async_trait::async_trait;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

/// Scripted [`MediaFetcher`]
///
/// Plays back a configured stdout transcript and exit code instead of
/// spawning a real process, and records whether the controller killed it.
pub(crate) struct MockFetcher {
    /// Metadata document returned by `video_info`; `None` simulates a failure
    pub info: Option<serde_json::Value>,
    /// Bytes the fake process writes to stdout
    pub stdout: Vec<u8>,
    /// Keep stdout open until the process is killed (for disconnect tests)
    pub hold_open: bool,
    /// Exit code reported by `wait`; `None` simulates signal termination
    pub exit_code: Option<i32>,
    /// Fail the spawn itself
    pub spawn_fails: bool,
    /// Write a fake output file at the requested path when spawned
    pub write_output: bool,
    /// Set once `kill` is called on the fake process
    pub killed: Arc<AtomicBool>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self {
            info: Some(serde_json::json!({"title": "Test Video"})),
            stdout: b"[download]  50.0%\n[download] 100.0%\n".to_vec(),
            hold_open: false,
            exit_code: Some(0),
            spawn_fails: false,
            write_output: true,
            killed: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn video_info(&self, _url: &str) -> Result<serde_json::Value> {
        self.info.clone().ok_or_else(|| {
            Error::Fetch(FetchError::Metadata {
                reason: "simulated metadata failure".to_string(),
            })
        })
    }

    async fn spawn_download(&self, spec: &DownloadSpec) -> Result<DownloadHandle> {
        if self.spawn_fails {
            return Err(Error::Fetch(FetchError::Spawn {
                reason: "simulated spawn failure".to_string(),
            }));
        }

        if self.write_output {
            std::fs::write(&spec.output_path, b"fake video data")?;
        }

        let cancel = CancellationToken::new();
        let stdout: Box<dyn tokio::io::AsyncRead + Send + Unpin> = if self.hold_open {
            let (reader, mut writer) = tokio::io::duplex(4096);
            let bytes = self.stdout.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let _ = writer.write_all(&bytes).await;
                // keep the pipe open until the process is killed
                cancel.cancelled().await;
                drop(writer);
            });
            Box::new(reader)
        } else {
            Box::new(Cursor::new(self.stdout.clone()))
        };

        Ok(DownloadHandle {
            stdout,
            stderr: Box::new(Cursor::new(Vec::new())),
            process: Box::new(MockProcess {
                exit_code: self.exit_code,
                hold_open: self.hold_open,
                killed: self.killed.clone(),
                cancel,
            }),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

struct MockProcess {
    exit_code: Option<i32>,
    hold_open: bool,
    killed: Arc<AtomicBool>,
    cancel: CancellationToken,
}

#[async_trait]
impl ProcessHandle for MockProcess {
    async fn wait(&mut self) -> std::io::Result<Option<i32>> {
        if self.hold_open {
            self.cancel.cancelled().await;
            return Ok(None);
        }
        Ok(self.exit_code)
    }

    async fn kill(&mut self) -> std::io::Result<()> {
        self.killed.store(true, Ordering::SeqCst);
        self.cancel.cancel();
        Ok(())
    }
}
