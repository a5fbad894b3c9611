use super::*;
use axum::http::StatusCode;

#[tokio::test]
async fn missing_url_returns_400() {
    let (downloader, _temp_dir) = create_test_downloader(MockFetcher::default());
    let router = test_router(downloader);

    let response = get(&router, "/info").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn metadata_document_is_returned_verbatim() {
    let fetcher = MockFetcher {
        info: Some(serde_json::json!({
            "title": "A Video",
            "duration": 123,
            "uploader": "someone"
        })),
        ..Default::default()
    };
    let (downloader, _temp_dir) = create_test_downloader(fetcher);
    let router = test_router(downloader);

    let response = get(&router, "/info?url=https%3A%2F%2Fexample.com%2Fwatch%3Fv%3Dabc").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["title"], "A Video");
    assert_eq!(body["duration"], 123);
}

#[tokio::test]
async fn fetch_failure_returns_500_with_detail() {
    let fetcher = MockFetcher {
        info: None,
        ..Default::default()
    };
    let (downloader, _temp_dir) = create_test_downloader(fetcher);
    let router = test_router(downloader);

    let response = get(&router, "/info?url=https%3A%2F%2Fexample.com").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "metadata_fetch_failed");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("simulated metadata failure")
    );
}
