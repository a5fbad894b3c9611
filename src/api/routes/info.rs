//! Metadata retrieval.

use super::VideoInfoQuery;
use crate::api::AppState;
use crate::error::Error;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /info - Fetch the metadata document for a URL without downloading
#[utoipa::path(
    get,
    path = "/info",
    tag = "downloads",
    params(
        ("url" = Option<String>, Query, description = "Source video URL")
    ),
    responses(
        (status = 200, description = "Metadata document produced by the fetch tool"),
        (status = 400, description = "Missing or empty url", body = crate::error::ApiError),
        (status = 500, description = "Metadata retrieval failed", body = crate::error::ApiError)
    )
)]
pub async fn video_info(
    State(state): State<AppState>,
    Query(query): Query<VideoInfoQuery>,
) -> Response {
    let url = match query.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return Error::Validation("Video URL is required".to_string()).into_response(),
    };

    match state.downloader.video_info(&url).await {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "metadata retrieval failed");
            e.into_response()
        }
    }
}
