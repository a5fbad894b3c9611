//! yt-dlp backed implementation of [`MediaFetcher`]

use super::traits::{DownloadHandle, DownloadSpec, MediaFetcher, ProcessHandle};
use crate::config::ToolsConfig;
use crate::error::{Error, FetchError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Media fetcher that shells out to the yt-dlp binary
///
/// Metadata mode runs `yt-dlp --dump-single-json`; download mode runs the
/// tool with a format-selection expression, an exact output path, and a
/// merge directive, wiring in the ffmpeg location when one is known.
pub struct YtDlpFetcher {
    binary_path: PathBuf,
    ffmpeg_path: Option<PathBuf>,
}

impl YtDlpFetcher {
    /// Create a fetcher with explicit binary locations
    pub fn new(binary_path: PathBuf, ffmpeg_path: Option<PathBuf>) -> Self {
        Self {
            binary_path,
            ffmpeg_path,
        }
    }

    /// Resolve binaries from config, searching PATH where allowed
    ///
    /// yt-dlp is required; ffmpeg is optional but its absence is logged
    /// since merged formats need it.
    pub fn from_config(tools: &ToolsConfig) -> Result<Self> {
        let binary_path = match &tools.ytdlp_path {
            Some(path) => path.clone(),
            None if tools.search_path => {
                which::which("yt-dlp").map_err(|_| FetchError::ToolNotFound {
                    tool: "yt-dlp".to_string(),
                })?
            }
            None => {
                return Err(Error::Fetch(FetchError::ToolNotFound {
                    tool: "yt-dlp".to_string(),
                }));
            }
        };

        let ffmpeg_path = match &tools.ffmpeg_path {
            Some(path) => Some(path.clone()),
            None if tools.search_path => which::which("ffmpeg").ok(),
            None => None,
        };

        if ffmpeg_path.is_none() {
            tracing::warn!("ffmpeg not found, merging separate audio/video streams will fail");
        }

        tracing::info!(
            binary = %binary_path.display(),
            ffmpeg = ffmpeg_path.as_deref().map(|p| p.display().to_string()).unwrap_or_default(),
            "fetch tool resolved"
        );

        Ok(Self::new(binary_path, ffmpeg_path))
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn video_info(&self, url: &str) -> Result<serde_json::Value> {
        let output = Command::new(&self.binary_path)
            .arg(url)
            .args(["--dump-single-json", "--no-warnings", "--prefer-free-formats"])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| FetchError::Metadata {
                reason: format!("failed to execute yt-dlp: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .trim()
                .lines()
                .last()
                .unwrap_or("yt-dlp reported an error")
                .to_string();
            return Err(Error::Fetch(FetchError::Metadata { reason }));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            Error::Fetch(FetchError::Metadata {
                reason: format!("invalid metadata document: {e}"),
            })
        })
    }

    async fn spawn_download(&self, spec: &DownloadSpec) -> Result<DownloadHandle> {
        let mut command = Command::new(&self.binary_path);
        command
            .arg(&spec.url)
            .args(["-f", &spec.format])
            .arg("-o")
            .arg(&spec.output_path)
            .args(["--merge-output-format", &spec.merge_output_format])
            .args(["--newline", "--no-warnings"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ffmpeg) = &self.ffmpeg_path {
            command.arg("--ffmpeg-location").arg(ffmpeg);
        }

        let mut child = command.spawn().map_err(|e| FetchError::Spawn {
            reason: format!("failed to execute yt-dlp: {e}"),
        })?;

        let stdout = child.stdout.take().ok_or_else(|| FetchError::Spawn {
            reason: "child stdout was not captured".to_string(),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| FetchError::Spawn {
            reason: "child stderr was not captured".to_string(),
        })?;

        Ok(DownloadHandle {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            process: Box::new(ChildProcess(child)),
        })
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// [`ProcessHandle`] over a tokio child process
struct ChildProcess(Child);

#[async_trait]
impl ProcessHandle for ChildProcess {
    async fn wait(&mut self) -> std::io::Result<Option<i32>> {
        self.0.wait().await.map(|status| status.code())
    }

    async fn kill(&mut self) -> std::io::Result<()> {
        self.0.kill().await
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> DownloadSpec {
        DownloadSpec {
            url: "https://example.com/watch?v=abc".to_string(),
            output_path: PathBuf::from("/tmp/out.mp4"),
            format: "best".to_string(),
            merge_output_format: "mp4".to_string(),
        }
    }

    #[test]
    fn from_config_uses_explicit_paths_without_searching() {
        let tools = ToolsConfig {
            ytdlp_path: Some(PathBuf::from("/opt/tools/yt-dlp")),
            ffmpeg_path: Some(PathBuf::from("/opt/tools/ffmpeg")),
            search_path: false,
        };

        let fetcher = YtDlpFetcher::from_config(&tools).unwrap();
        assert_eq!(fetcher.binary_path, PathBuf::from("/opt/tools/yt-dlp"));
        assert_eq!(
            fetcher.ffmpeg_path,
            Some(PathBuf::from("/opt/tools/ffmpeg"))
        );
    }

    #[test]
    fn from_config_without_search_requires_explicit_path() {
        let tools = ToolsConfig {
            ytdlp_path: None,
            ffmpeg_path: None,
            search_path: false,
        };

        let result = YtDlpFetcher::from_config(&tools);
        assert!(matches!(
            result,
            Err(Error::Fetch(FetchError::ToolNotFound { .. }))
        ));
    }

    #[test]
    fn from_config_search_agrees_with_which() {
        let tools = ToolsConfig::default();
        let found = which::which("yt-dlp").is_ok();
        assert_eq!(
            YtDlpFetcher::from_config(&tools).is_ok(),
            found,
            "from_config must succeed if and only if yt-dlp is on PATH"
        );
    }

    #[tokio::test]
    async fn spawn_download_with_invalid_binary_path_fails() {
        let fetcher = YtDlpFetcher::new(PathBuf::from("/nonexistent/path/to/yt-dlp"), None);

        let Err(err) = fetcher.spawn_download(&spec()).await else {
            panic!("expected spawn to fail");
        };
        match err {
            Error::Fetch(FetchError::Spawn { reason }) => {
                assert!(reason.contains("failed to execute yt-dlp"));
            }
            other => panic!("expected Spawn error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn video_info_with_invalid_binary_path_fails() {
        let fetcher = YtDlpFetcher::new(PathBuf::from("/nonexistent/path/to/yt-dlp"), None);

        let result = fetcher.video_info("https://example.com/watch?v=abc").await;
        match result {
            Err(Error::Fetch(FetchError::Metadata { reason })) => {
                assert!(reason.contains("failed to execute yt-dlp"));
            }
            other => panic!("expected Metadata error, got: {other:?}"),
        }
    }
}
