//! Integration with the external fetch tool (yt-dlp)
//!
//! Split into focused submodules:
//! - [`traits`] — the [`MediaFetcher`] seam and asynchronous child-process handles
//! - [`cli`] — the yt-dlp implementation spawned via tokio
//! - [`progress`] — incremental parsing of `[download] NN.N%` output

pub mod cli;
pub mod progress;
pub mod traits;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod mock;

pub use cli::YtDlpFetcher;
pub use progress::ProgressParser;
pub use traits::{DownloadHandle, DownloadSpec, MediaFetcher, ProcessHandle};
