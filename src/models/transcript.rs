use serde::{Deserialize, Serialize};

/// One timed line of a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start offset in seconds
    pub start: f64,
    /// Duration in seconds
    pub duration: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            text: text.into(),
        }
    }
}

/// Success body of `POST /get_transcript`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub video_id: String,
    pub transcript: String,
}

/// Request body of `POST /get_transcript`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptRequest {
    pub url: Option<String>,
}

/// `[MM:SS]`; fractional seconds are truncated and minutes do not wrap.
pub fn format_timestamp(start_secs: f64) -> String {
    let total = if start_secs.is_finite() && start_secs > 0.0 {
        start_secs as u64
    } else {
        0
    };
    format!("[{:02}:{:02}]", total / 60, total % 60)
}

/// Render segments as newline-joined `[MM:SS] text` lines
pub fn format_transcript(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| format!("{} {}", format_timestamp(s.start), s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "[00:00]");
        assert_eq!(format_timestamp(5.9), "[00:05]");
        assert_eq!(format_timestamp(65.2), "[01:05]");
        assert_eq!(format_timestamp(3725.0), "[62:05]");
        assert_eq!(format_timestamp(-1.0), "[00:00]");
    }

    #[test]
    fn test_format_transcript() {
        let segments = vec![
            TranscriptSegment::new(0.0, 2.0, "Hello"),
            TranscriptSegment::new(61.5, 3.0, "world"),
        ];
        assert_eq!(format_transcript(&segments), "[00:00] Hello\n[01:01] world");
        assert_eq!(format_transcript(&[]), "");
    }
}
