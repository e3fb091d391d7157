use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, ScribeError};

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("video id pattern is valid")
});

/// Extract the 11-character YouTube video ID from a URL.
///
/// Matches the first `v=` query value or path segment of exactly that shape.
pub fn extract_video_id(url: &str) -> Result<String> {
    VIDEO_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ScribeError::InvalidVideoUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc123XYZ_0").unwrap(),
            "abc123XYZ_0"
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_short_and_embed_urls() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ?feature=share").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            extract_video_id("https://example.com/short"),
            Err(ScribeError::InvalidVideoUrl(_))
        ));
        assert!(extract_video_id("").is_err());
        assert!(extract_video_id("not a url").is_err());
    }
}
