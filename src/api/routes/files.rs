//! Staged-file listing and single-use retrieval.

use super::FetchFileQuery;
use crate::api::AppState;
use crate::error::Error;
use crate::staging::RemoveOnDrop;
use crate::types::JobId;
use crate::utils::header_safe_filename;
use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::io::ReaderStream;

/// GET / - List currently staged output files
#[utoipa::path(
    get,
    path = "/",
    tag = "files",
    responses(
        (status = 200, description = "Staged files awaiting retrieval", body = Vec<crate::types::StagedEntry>)
    )
)]
pub async fn list_staged(State(state): State<AppState>) -> impl IntoResponse {
    let listing = state.downloader.staging().snapshot().await;
    (StatusCode::OK, Json(listing))
}

/// GET /file/:id - Retrieve a staged file exactly once
///
/// The file is deleted after the transfer attempt, whether it completed or
/// not, so a second request for the same id reports 404.
#[utoipa::path(
    get,
    path = "/file/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "Handoff reference returned by the success event"),
        ("filename" = Option<String>, Query, description = "Filename suggested to the client")
    ),
    responses(
        (status = 200, description = "File bytes as an attachment", content_type = "application/octet-stream"),
        (status = 404, description = "Unknown or already consumed id", body = crate::error::ApiError)
    )
)]
pub async fn fetch_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<FetchFileQuery>,
) -> Response {
    let id = JobId::from(id);
    let Some(staged) = state.downloader.staging().claim(&id).await else {
        return Error::FileMissing(id.to_string()).into_response();
    };

    // From here on the file is this request's responsibility; it is removed
    // when the transfer body is dropped, no matter how the transfer ends.
    let cleanup = RemoveOnDrop::new(staged.path.clone());

    let file = match tokio::fs::File::open(&staged.path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(job_id = %id, error = %e, "staged file vanished before transfer");
            drop(cleanup);
            return Error::FileMissing(id.to_string()).into_response();
        }
    };

    let filename = query
        .filename
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "video.mp4".to_string());
    let disposition = format!("attachment; filename=\"{}\"", header_safe_filename(&filename));

    tracing::info!(
        job_id = %id,
        filename = %filename,
        size_bytes = staged.size_bytes,
        "file transfer started"
    );

    let body = Body::from_stream(FileTransfer {
        inner: ReaderStream::new(file),
        _cleanup: cleanup,
    });

    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
            (header::CONTENT_LENGTH, staged.size_bytes.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// File byte stream that removes the underlying file once dropped
struct FileTransfer {
    inner: ReaderStream<tokio::fs::File>,
    _cleanup: RemoveOnDrop,
}

impl Stream for FileTransfer {
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}
