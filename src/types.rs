//! Core types for video-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use utoipa::ToSchema;

/// Unique identifier for a download job
///
/// Derived from the request arrival time plus a process-wide counter, so
/// concurrent jobs always get distinct output filenames. The id doubles as
/// the handoff reference a client exchanges for the produced file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(String);

static JOB_SEQ: AtomicU64 = AtomicU64::new(0);

impl JobId {
    /// Generate a fresh id for an accepted request
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let seq = JOB_SEQ.fetch_add(1, Ordering::Relaxed) % 10_000;
        Self(format!("{millis}-{seq:04}"))
    }

    /// View the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Event relayed to the client over a download stream
///
/// The wire format is one self-contained JSON object per line. A job emits
/// zero or more `progress` events followed by exactly one terminal event,
/// `success` or `error`, after which the stream ends.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Download progress update
    Progress {
        /// Progress percentage (0.0 to 100.0); repeats and decreases are
        /// passed through exactly as the fetch tool reported them
        percent: f32,
        /// Human-readable phase hint shown next to the percentage
        #[serde(skip_serializing_if = "Option::is_none")]
        eta: Option<String>,
    },

    /// Terminal event: the produced file is staged for retrieval
    Success {
        /// Human-readable completion message
        message: String,
        /// Relative URL the client exchanges for the file bytes, valid for
        /// a single retrieval
        download_url: String,
    },

    /// Terminal event: the job failed
    Error {
        /// Human-readable cause, including the exit code when applicable
        message: String,
    },
}

impl StreamEvent {
    /// Whether this event closes the job's stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Success { .. } | StreamEvent::Error { .. })
    }
}

/// Request body for POST /download
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DownloadRequest {
    /// Source video URL (required, non-empty)
    pub url: Option<String>,
}

/// Listing row for a staged output file (GET /)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StagedEntry {
    /// Handoff reference
    pub id: JobId,
    /// Suggested download filename
    pub filename: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// When the job finished and the file became retrievable
    pub staged_at: DateTime<Utc>,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_ids_are_unique() {
        let mut ids: Vec<String> = (0..100).map(|_| JobId::generate().0).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 100, "generated ids must never collide");
    }

    #[test]
    fn job_ids_are_filesystem_safe() {
        let id = JobId::generate();
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c == '-'),
            "id {id} contains characters unsafe for filenames"
        );
    }

    #[test]
    fn progress_event_wire_format() {
        let event = StreamEvent::Progress {
            percent: 42.5,
            eta: Some("Downloading...".to_string()),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["percent"], 42.5);
        assert_eq!(json["eta"], "Downloading...");
    }

    #[test]
    fn progress_event_omits_missing_eta() {
        let event = StreamEvent::Progress {
            percent: 0.0,
            eta: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("eta"));
    }

    #[test]
    fn success_event_wire_format() {
        let event = StreamEvent::Success {
            message: "Download ready".to_string(),
            download_url: "/file/123?filename=clip.mp4".to_string(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "success");
        assert_eq!(json["download_url"], "/file/123?filename=clip.mp4");
    }

    #[test]
    fn error_event_wire_format() {
        let event = StreamEvent::Error {
            message: "Download process exited with code: 1".to_string(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert!(json["message"].as_str().unwrap().contains("1"));
    }

    #[test]
    fn only_success_and_error_are_terminal() {
        assert!(
            !StreamEvent::Progress {
                percent: 100.0,
                eta: None
            }
            .is_terminal()
        );
        assert!(
            StreamEvent::Success {
                message: String::new(),
                download_url: String::new()
            }
            .is_terminal()
        );
        assert!(
            StreamEvent::Error {
                message: String::new()
            }
            .is_terminal()
        );
    }
}
