use super::*;
use crate::fetcher::mock::MockFetcher;
use axum::body::Body;
use axum::http::Request;
use tempfile::TempDir;
use tower::ServiceExt;

mod info;

/// Helper to create a test VideoDownloader driven by a scripted fetcher,
/// with its downloads directory inside a tempdir.
fn create_test_downloader(fetcher: MockFetcher) -> (Arc<VideoDownloader>, TempDir) {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let mut config = Config::default();
    config.download.download_dir = Some(temp_dir.path().to_path_buf());
    config.download.fallback_dir = temp_dir.path().join("fallback");

    let downloader =
        VideoDownloader::with_fetcher(config, Arc::new(fetcher)).expect("create downloader");
    (Arc::new(downloader), temp_dir)
}

fn test_router(downloader: Arc<VideoDownloader>) -> Router {
    let config = downloader.config().clone();
    create_router(downloader, config)
}

async fn get(router: &Router, uri: &str) -> axum::response::Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    router.clone().oneshot(request).await.expect("send request")
}

async fn post_download(router: &Router, body: &str) -> axum::response::Response {
    let request = Request::builder()
        .method("POST")
        .uri("/download")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    router.clone().oneshot(request).await.expect("send request")
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("parse body json")
}

/// Read a streaming NDJSON body to completion and parse each line.
async fn body_events(response: axum::response::Response) -> Vec<serde_json::Value> {
    let bytes = body_bytes(response).await;
    String::from_utf8(bytes)
        .expect("stream body is utf-8")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("parse event line"))
        .collect()
}
