//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`download`] — Download submission and the progress event stream
//! - [`files`] — Staged-file listing and single-use retrieval
//! - [`info`] — Metadata retrieval
//! - [`system`] — Health and OpenAPI

use serde::{Deserialize, Serialize};

mod download;
mod files;
mod info;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use download::*;
pub use files::*;
pub use info::*;
pub use system::*;

// ============================================================================
// Query Types (shared across handlers)
// ============================================================================

/// Query parameters for GET /file/:id
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct FetchFileQuery {
    /// Filename suggested to the client (default: "video.mp4")
    pub filename: Option<String>,
}

/// Query parameters for GET /info
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct VideoInfoQuery {
    /// Source video URL
    pub url: Option<String>,
}
