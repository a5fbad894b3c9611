//! Incremental parsing of the fetch tool's progress output

use regex::Regex;
use std::sync::OnceLock;

/// Upper bound on buffered bytes while waiting for a line delimiter
const MAX_PENDING: usize = 4096;

#[allow(clippy::expect_used)]
fn progress_regex() -> &'static Regex {
    static PROGRESS_RE: OnceLock<Regex> = OnceLock::new();
    PROGRESS_RE.get_or_init(|| {
        Regex::new(r"\[download\]\s+(\d+(?:\.\d+)?)%").expect("progress pattern is a valid regex")
    })
}

/// Extract the percent from one line of fetch-tool output
pub fn parse_progress_line(line: &str) -> Option<f32> {
    progress_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Incremental progress parser over raw stdout chunks
///
/// Chunk boundaries do not align with lines, so input is buffered until a
/// delimiter arrives (`\n`, or `\r` — yt-dlp rewrites its progress line
/// with carriage returns when not run with `--newline`). Anything that is
/// not a progress marker is discarded without error; percentages are
/// emitted exactly as written, with no smoothing, deduplication, or
/// monotonicity enforcement.
#[derive(Debug, Default)]
pub struct ProgressParser {
    pending: String,
}

impl ProgressParser {
    /// Create an empty parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of process output, returning the percents it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<f32> {
        self.pending.push_str(&String::from_utf8_lossy(chunk));

        let mut percents = Vec::new();
        while let Some(pos) = self.pending.find(['\n', '\r']) {
            let line: String = self.pending.drain(..=pos).collect();
            if let Some(percent) = parse_progress_line(&line) {
                percents.push(percent);
            }
        }

        // A stream without delimiters must not grow the buffer unboundedly;
        // the kept tail is still longer than any progress marker.
        if self.pending.len() > MAX_PENDING {
            let mut cut = self.pending.len() - MAX_PENDING;
            while !self.pending.is_char_boundary(cut) {
                cut += 1;
            }
            self.pending.drain(..cut);
        }

        percents
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_round_trips_the_numeric_literal() {
        assert_eq!(
            parse_progress_line("[download]  37.2% of ~10.53MiB at 2.11MiB/s ETA 00:03"),
            Some(37.2)
        );
    }

    #[test]
    fn integer_percent_parses() {
        assert_eq!(parse_progress_line("[download] 100% of 4.2MiB"), Some(100.0));
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        assert_eq!(parse_progress_line("[merger] Merging formats into out.mp4"), None);
        assert_eq!(parse_progress_line("[download] Destination: out.mp4"), None);
        assert_eq!(parse_progress_line(""), None);
    }

    #[test]
    fn feed_handles_chunk_boundaries_inside_a_marker() {
        let mut parser = ProgressParser::new();
        assert!(parser.feed(b"[down").is_empty());
        assert!(parser.feed(b"load]  45.1").is_empty());
        assert_eq!(parser.feed(b"% of 1MiB\n"), vec![45.1]);
    }

    #[test]
    fn feed_splits_on_carriage_returns() {
        let mut parser = ProgressParser::new();
        let percents = parser.feed(b"\r[download]  10.0%\r[download]  12.5%\r");
        assert_eq!(percents, vec![10.0, 12.5]);
    }

    #[test]
    fn feed_emits_multiple_markers_per_chunk() {
        let mut parser = ProgressParser::new();
        let percents = parser.feed(b"[download]  1.0%\n[download]  2.0%\nnoise\n[download]  3.0%\n");
        assert_eq!(percents, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn repeats_and_decreases_are_passed_through() {
        let mut parser = ProgressParser::new();
        let percents = parser.feed(b"[download]  5.0%\n[download]  5.0%\n[download]  3.0%\n");
        assert_eq!(percents, vec![5.0, 5.0, 3.0]);
    }

    #[test]
    fn garbage_is_discarded_without_error() {
        let mut parser = ProgressParser::new();
        assert!(parser.feed(b"warning: something\nsomething else\n").is_empty());
    }

    #[test]
    fn buffer_is_bounded_without_delimiters() {
        let mut parser = ProgressParser::new();
        for _ in 0..10 {
            assert!(parser.feed(&[b'x'; 2000]).is_empty());
        }
        assert!(parser.pending.len() <= MAX_PENDING);

        // the parser still recognizes markers after the overflow is flushed
        assert!(parser.feed(b"\n").is_empty());
        assert_eq!(parser.feed(b"[download]  7.0%\n"), vec![7.0]);
    }

    #[test]
    fn lossy_decoding_does_not_lose_following_markers() {
        let mut parser = ProgressParser::new();
        let mut chunk = vec![0xff, 0xfe];
        chunk.extend_from_slice(b"\n[download]  9.9%\n");
        assert_eq!(parser.feed(&chunk), vec![9.9]);
    }
}
