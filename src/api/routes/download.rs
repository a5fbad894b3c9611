//! Download submission and the progress event stream.

use crate::api::AppState;
use crate::error::Error;
use crate::types::{DownloadRequest, StreamEvent};
use axum::{
    Json,
    body::{Body, Bytes},
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

/// POST /download - Start a download and stream its lifecycle events
///
/// The response body is a chunked stream of line-delimited JSON events:
/// zero or more `progress` records followed by exactly one terminal
/// `success` or `error` record, after which the stream ends. Once the
/// stream is open there is no side channel, so runtime failures arrive as
/// the terminal `error` record rather than an HTTP status.
#[utoipa::path(
    post,
    path = "/download",
    tag = "downloads",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Line-delimited JSON event stream", content_type = "application/x-ndjson", body = StreamEvent),
        (status = 400, description = "Missing or empty url", body = crate::error::ApiError)
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> Response {
    let url = match request.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return Error::Validation("Video URL is required".to_string()).into_response(),
    };

    let (id, events) = state.downloader.start_job(url);
    tracing::info!(job_id = %id, "download stream opened");

    let body = Body::from_stream(ReceiverStream::new(events).filter_map(encode_event));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        body,
    )
        .into_response()
}

/// Encode one event as a self-contained JSON line.
///
/// An event that fails to serialize is logged and skipped; it must never
/// stall the stream or the job's cleanup.
fn encode_event(
    event: StreamEvent,
) -> Option<std::result::Result<Bytes, std::convert::Infallible>> {
    match serde_json::to_string(&event) {
        Ok(mut line) => {
            line.push('\n');
            Some(Ok(Bytes::from(line)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to encode stream event");
            None
        }
    }
}
