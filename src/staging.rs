//! Staged output files awaiting single-use retrieval

use crate::types::{JobId, StagedEntry};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A produced file staged for handoff
#[derive(Clone, Debug)]
pub struct StagedFile {
    /// Where the merged output was written
    pub path: PathBuf,
    /// Sanitized video title
    pub title: String,
    /// File size in bytes at staging time
    pub size_bytes: u64,
    /// When the file became retrievable
    pub staged_at: DateTime<Utc>,
}

/// Map from handoff reference to staged file
///
/// Entries are claimed at most once: [`claim`](FileStaging::claim) removes
/// the entry, so a second retrieval of the same id reports "not found" even
/// while the first transfer is still streaming. The map is the only state
/// shared between concurrently completing jobs.
#[derive(Debug, Default)]
pub struct FileStaging {
    entries: Mutex<HashMap<JobId, StagedFile>>,
}

impl FileStaging {
    /// Create an empty staging map
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a produced file under its job id
    pub async fn insert(&self, id: JobId, path: PathBuf, title: String) {
        let size_bytes = tokio::fs::metadata(&path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        let staged = StagedFile {
            path,
            title,
            size_bytes,
            staged_at: Utc::now(),
        };
        self.entries.lock().await.insert(id, staged);
    }

    /// Remove and return the staged file for `id` (single use)
    pub async fn claim(&self, id: &JobId) -> Option<StagedFile> {
        self.entries.lock().await.remove(id)
    }

    /// Drop a staged entry and delete its file (the client never collected it)
    pub async fn discard(&self, id: &JobId) {
        if let Some(staged) = self.claim(id).await {
            remove_file_if_exists(&staged.path).await;
        }
    }

    /// Current listing, newest first
    pub async fn snapshot(&self) -> Vec<StagedEntry> {
        let entries = self.entries.lock().await;
        let mut listing: Vec<StagedEntry> = entries
            .iter()
            .map(|(id, staged)| {
                let ext = staged
                    .path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("mp4");
                StagedEntry {
                    id: id.clone(),
                    filename: format!("{}.{}", staged.title, ext),
                    size_bytes: staged.size_bytes,
                    staged_at: staged.staged_at,
                }
            })
            .collect();
        listing.sort_by(|a, b| b.staged_at.cmp(&a.staged_at));
        listing
    }
}

/// Best-effort removal of a job's output file
pub(crate) async fn remove_file_if_exists(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "removed output file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove output file")
        }
    }
}

/// Deletes the underlying file when dropped
///
/// Held by the transfer body so the file goes away after the transfer
/// attempt completes — success, error, or client abort alike.
#[derive(Debug)]
pub struct RemoveOnDrop {
    path: PathBuf,
}

impl RemoveOnDrop {
    /// Take ownership of the file at `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "cleaned up staged file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to clean up staged file")
            }
        }
    }
}
