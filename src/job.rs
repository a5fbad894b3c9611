//! Job lifecycle controller
//!
//! Owns the state machine coordinating metadata fetch → process spawn →
//! progress relay → terminal event → stream closure, plus cleanup on every
//! exit path: failure, signal termination, and client disconnect.

use crate::config::Config;
use crate::error::FetchError;
use crate::fetcher::{DownloadSpec, MediaFetcher, ProcessHandle, ProgressParser};
use crate::staging::{self, FileStaging};
use crate::types::{JobId, StreamEvent};
use crate::utils::sanitize_title;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use url::Url;

/// Lifecycle states of a download job
///
/// `Init → FetchingMetadata → Downloading → {Succeeded | Failed} → Closed`.
/// Exactly one terminal event is emitted per job, immediately before the
/// transition to `Closed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum JobState {
    Init,
    FetchingMetadata,
    Downloading,
    Succeeded,
    Failed,
    Closed,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobState::Init => "init",
            JobState::FetchingMetadata => "fetching_metadata",
            JobState::Downloading => "downloading",
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Everything a job needs, resolved up front and passed in explicitly
pub(crate) struct JobContext {
    pub id: JobId,
    pub url: String,
    pub output_path: PathBuf,
    pub fetcher: Arc<dyn MediaFetcher>,
    pub config: Arc<Config>,
    pub staging: Arc<FileStaging>,
}

/// Drive one download job to its terminal event.
///
/// Every event goes through `events` in observation order. The channel
/// closing early means the client went away: the child process is killed
/// and any partial output removed.
pub(crate) async fn run(ctx: JobContext, events: mpsc::Sender<StreamEvent>) {
    let host = Url::parse(&ctx.url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned));
    tracing::info!(
        job_id = %ctx.id,
        host = host.as_deref().unwrap_or("-"),
        fetcher = ctx.fetcher.name(),
        "job accepted"
    );

    let mut state = JobState::Init;
    advance(&ctx.id, &mut state, JobState::FetchingMetadata);

    let liveness = StreamEvent::Progress {
        percent: 0.0,
        eta: Some("Fetching info...".to_string()),
    };
    if events.send(liveness).await.is_err() {
        tracing::debug!(job_id = %ctx.id, "client disconnected before metadata fetch");
        advance(&ctx.id, &mut state, JobState::Closed);
        return;
    }

    let title = fetch_title(&ctx).await;

    advance(&ctx.id, &mut state, JobState::Downloading);
    let spec = DownloadSpec {
        url: ctx.url.clone(),
        output_path: ctx.output_path.clone(),
        format: ctx.config.download.format.clone(),
        merge_output_format: ctx.config.download.merge_output_format.clone(),
    };

    let handle = match ctx.fetcher.spawn_download(&spec).await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(job_id = %ctx.id, error = %e, "failed to start download process");
            fail(&ctx, &mut state, &events, e.to_string()).await;
            return;
        }
    };
    let mut stdout = handle.stdout;
    let mut process = handle.process;

    // Drain stderr concurrently so the child can never block on a full pipe.
    let stderr_task = tokio::spawn(log_stderr(handle.stderr, ctx.id.clone()));

    // Relay progress ticks until the child closes its stdout.
    let mut parser = ProgressParser::new();
    let mut buf = [0u8; 2048];
    loop {
        tokio::select! {
            read = stdout.read(&mut buf) => match read {
                Ok(0) => break,
                Ok(n) => {
                    for percent in parser.feed(&buf[..n]) {
                        let tick = StreamEvent::Progress {
                            percent,
                            eta: Some("Downloading...".to_string()),
                        };
                        if events.send(tick).await.is_err() {
                            abort(&ctx, &mut state, process.as_mut()).await;
                            stderr_task.abort();
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(job_id = %ctx.id, error = %e, "error reading process output");
                    break;
                }
            },
            _ = events.closed() => {
                abort(&ctx, &mut state, process.as_mut()).await;
                stderr_task.abort();
                return;
            }
        }
    }

    // Stdout is closed; wait for the exit status, still watching for a
    // client disconnect.
    let waited = {
        let wait = process.wait();
        tokio::pin!(wait);
        tokio::select! {
            status = &mut wait => Some(status),
            _ = events.closed() => None,
        }
    };
    let status = match waited {
        Some(status) => status,
        None => {
            abort(&ctx, &mut state, process.as_mut()).await;
            stderr_task.abort();
            return;
        }
    };
    let _ = stderr_task.await;

    match status {
        Ok(Some(0)) => {
            advance(&ctx.id, &mut state, JobState::Succeeded);
            ctx.staging
                .insert(ctx.id.clone(), ctx.output_path.clone(), title.clone())
                .await;

            let filename = format!("{}.{}", title, ctx.config.download.merge_output_format);
            let download_url = format!("/file/{}?filename={}", ctx.id, urlencoding::encode(&filename));
            tracing::info!(job_id = %ctx.id, title = %title, "download complete, file staged");

            let done = StreamEvent::Success {
                message: "Download ready".to_string(),
                download_url,
            };
            if events.send(done).await.is_err() {
                // The client left between completion and handoff; nobody can
                // claim the file anymore.
                tracing::debug!(job_id = %ctx.id, "client disconnected before handoff, discarding file");
                ctx.staging.discard(&ctx.id).await;
            }
            advance(&ctx.id, &mut state, JobState::Closed);
        }
        Ok(Some(code)) => {
            tracing::error!(job_id = %ctx.id, code, "download process failed");
            fail(&ctx, &mut state, &events, FetchError::Exited { code }.to_string()).await;
        }
        Ok(None) => {
            tracing::error!(job_id = %ctx.id, "download process terminated by signal");
            fail(&ctx, &mut state, &events, FetchError::Terminated.to_string()).await;
        }
        Err(e) => {
            tracing::error!(job_id = %ctx.id, error = %e, "failed to await download process");
            fail(&ctx, &mut state, &events, e.to_string()).await;
        }
    }
}

/// Fetch and sanitize the video title; any failure falls back to the default
///
/// This step must never abort the job.
async fn fetch_title(ctx: &JobContext) -> String {
    let fallback = ctx.config.download.default_title.clone();
    match ctx.fetcher.video_info(&ctx.url).await {
        Ok(info) => info
            .get("title")
            .and_then(|t| t.as_str())
            .map(sanitize_title)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(fallback),
        Err(e) => {
            tracing::warn!(job_id = %ctx.id, error = %e, "metadata fetch failed, using default title");
            fallback
        }
    }
}

/// Emit the terminal error event and remove any partial output
async fn fail(
    ctx: &JobContext,
    state: &mut JobState,
    events: &mpsc::Sender<StreamEvent>,
    message: String,
) {
    advance(&ctx.id, state, JobState::Failed);
    staging::remove_file_if_exists(&ctx.output_path).await;
    if events.send(StreamEvent::Error { message }).await.is_err() {
        tracing::debug!(job_id = %ctx.id, "client disconnected before terminal event");
    }
    advance(&ctx.id, state, JobState::Closed);
}

/// Kill the child and remove partial output after a client disconnect
async fn abort(ctx: &JobContext, state: &mut JobState, process: &mut dyn ProcessHandle) {
    tracing::info!(job_id = %ctx.id, "client disconnected, terminating download process");
    if let Err(e) = process.kill().await {
        tracing::warn!(job_id = %ctx.id, error = %e, "failed to kill download process");
    }
    staging::remove_file_if_exists(&ctx.output_path).await;
    advance(&ctx.id, state, JobState::Failed);
    advance(&ctx.id, state, JobState::Closed);
}

/// Record a state transition
fn advance(id: &JobId, state: &mut JobState, next: JobState) {
    tracing::debug!(job_id = %id, from = %state, to = %next, "state transition");
    *state = next;
}

/// Forward child stderr lines to the log
async fn log_stderr(stderr: Box<dyn AsyncRead + Send + Unpin>, id: JobId) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(job_id = %id, "fetch tool: {line}");
    }
}
