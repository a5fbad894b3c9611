//! Utility functions

/// Sanitize a video title for use in filenames and handoff URLs.
///
/// Characters outside the safe set (ASCII alphanumerics, underscore,
/// whitespace, dot, hyphen) are replaced with underscores rather than
/// stripped, so the result never collapses to an empty string unless the
/// input was empty.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' || c.is_whitespace() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Make a client-supplied filename safe to embed in a Content-Disposition
/// header value: quotes and control characters are dropped.
pub fn header_safe_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_title_replaces_unsafe_characters() {
        assert_eq!(
            sanitize_title("My Video: Part/1?"),
            "My Video_ Part_1_"
        );
    }

    #[test]
    fn sanitize_title_keeps_safe_characters() {
        assert_eq!(
            sanitize_title("clip-01_final.v2 (draft)"),
            "clip-01_final.v2 _draft_"
        );
    }

    #[test]
    fn sanitize_title_replaces_non_ascii() {
        assert_eq!(sanitize_title("côté"), "c_t_");
    }

    #[test]
    fn sanitize_title_empty_stays_empty() {
        assert_eq!(sanitize_title(""), "");
    }

    #[test]
    fn header_safe_filename_drops_quotes_and_controls() {
        assert_eq!(
            header_safe_filename("a\"b\\c\r\nd.mp4"),
            "abcd.mp4"
        );
    }

    #[test]
    fn header_safe_filename_passes_ordinary_names() {
        assert_eq!(header_safe_filename("My Video.mp4"), "My Video.mp4");
    }
}
