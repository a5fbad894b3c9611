//! Error types for video-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (validation, fetch-tool, handoff)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for video-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for video-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "fallback_dir")
        key: Option<String>,
    },

    /// Invalid client input (missing or empty URL)
    #[error("{0}")]
    Validation(String),

    /// Fetch-tool error (metadata retrieval, spawn, runtime)
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// Handoff reference unknown, expired, or already consumed
    #[error("file {0} not found or expired")]
    FileMissing(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServer(String),
}

/// Errors from the external fetch tool
#[derive(Debug, Error)]
pub enum FetchError {
    /// Required external binary could not be located
    #[error("{tool} not found (install it or set an explicit path)")]
    ToolNotFound {
        /// Binary name that could not be located
        tool: String,
    },

    /// Metadata retrieval failed
    #[error("failed to fetch metadata: {reason}")]
    Metadata {
        /// Why the metadata document could not be produced
        reason: String,
    },

    /// Child process could not be started
    #[error("failed to start download process: {reason}")]
    Spawn {
        /// The underlying spawn failure
        reason: String,
    },

    /// Child process exited with a non-zero code
    #[error("Download process exited with code: {code}")]
    Exited {
        /// The process exit code
        code: i32,
    },

    /// Child process was terminated by a signal
    #[error("download process was terminated by a signal")]
    Terminated,
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs before
/// response streaming has begun. It follows a standard format with
/// machine-readable error codes, human-readable messages, and optional
/// contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "file_not_found",
///     "message": "file 1712345678901-0001 not found or expired",
///     "details": {
///       "file_id": "1712345678901-0001"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "file_not_found", "validation_error")
    ///
    /// Clients can use this for programmatic error handling.
    pub code: String,

    /// Human-readable error message
    ///
    /// This is suitable for displaying to end users.
    pub message: String,

    /// Optional additional context about the error
    ///
    /// This can include fields like the exit code, the missing tool name,
    /// or the handoff reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Validation(_) => 400,

            // 404 Not Found - Handoff id unknown or already consumed
            Error::FileMissing(_) => 404,

            // 502 Bad Gateway - The fetch tool failed at runtime
            Error::Fetch(FetchError::Exited { .. }) => 502,
            Error::Fetch(FetchError::Terminated) => 502,

            // 503 Service Unavailable - The fetch tool is not installed
            Error::Fetch(FetchError::ToolNotFound { .. }) => 503,

            // 500 Internal Server Error - Server-side issues
            Error::Config { .. } => 500,
            Error::Fetch(FetchError::Metadata { .. }) => 500,
            Error::Fetch(FetchError::Spawn { .. }) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServer(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(_) => "validation_error",
            Error::Fetch(FetchError::ToolNotFound { .. }) => "tool_not_found",
            Error::Fetch(FetchError::Metadata { .. }) => "metadata_fetch_failed",
            Error::Fetch(FetchError::Spawn { .. }) => "spawn_failed",
            Error::Fetch(FetchError::Exited { .. }) => "download_failed",
            Error::Fetch(FetchError::Terminated) => "download_terminated",
            Error::FileMissing(_) => "file_not_found",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServer(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Fetch(FetchError::Exited { code }) => {
                Some(serde_json::json!({ "exit_code": code }))
            }
            Error::Fetch(FetchError::ToolNotFound { tool }) => {
                Some(serde_json::json!({ "tool": tool }))
            }
            Error::FileMissing(id) => Some(serde_json::json!({ "file_id": id })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
