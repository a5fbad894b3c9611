//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the video-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the video-dl REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (if enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "video-dl REST API",
        version = "0.1.0",
        description = "REST API for submitting video downloads, streaming their progress, and retrieving produced files",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Downloads
        crate::api::routes::start_download,
        crate::api::routes::video_info,

        // File Handoff
        crate::api::routes::list_staged,
        crate::api::routes::fetch_file,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::DownloadRequest,
        crate::types::StreamEvent,
        crate::types::StagedEntry,
        crate::types::JobId,
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "downloads", description = "Submitting downloads and fetching metadata"),
        (name = "files", description = "Retrieving staged output files"),
        (name = "system", description = "Health and documentation")
    )
)]
pub struct ApiDoc;
