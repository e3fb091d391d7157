//! YouTube caption client
//!
//! Reads the caption track list embedded in the watch page, picks a track by
//! language priority and downloads it in the `json3` timed-text format.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::TranscriptService;
use crate::config::TranscriptConfig;
use crate::error::{Result, ScribeError};
use crate::models::{ProxyEndpoint, TranscriptSegment};

const WATCH_URL: &str = "https://www.youtube.com/watch";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";

/// Caption track descriptor from the player response
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<TimedTextSeg>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSeg {
    #[serde(default)]
    utf8: String,
}

/// Transcript service backed by YouTube's public caption endpoints
pub struct YouTubeTranscriptClient {
    direct: Client,
    timeout: Duration,
}

impl YouTubeTranscriptClient {
    pub fn new(config: &TranscriptConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        Ok(Self {
            direct: build_client(timeout, None)?,
            timeout,
        })
    }

    fn client_for(&self, proxy: Option<&ProxyEndpoint>) -> Result<Client> {
        match proxy {
            Some(endpoint) => build_client(self.timeout, Some(endpoint)),
            None => Ok(self.direct.clone()),
        }
    }

    async fn fetch_watch_page(&self, client: &Client, video_id: &str) -> Result<String> {
        let response = client
            .get(WATCH_URL)
            .query(&[("v", video_id)])
            .header(ACCEPT_LANGUAGE, "en-US")
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.text().await?),
            StatusCode::TOO_MANY_REQUESTS => Err(ScribeError::RequestBlocked),
            status => Err(ScribeError::UpstreamStatus(status.as_u16())),
        }
    }

    async fn fetch_track(&self, client: &Client, track: &CaptionTrack) -> Result<String> {
        let url = format!("{}&fmt=json3", track.base_url);
        let response = client.get(url).send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.text().await?),
            StatusCode::TOO_MANY_REQUESTS => Err(ScribeError::RequestBlocked),
            status => Err(ScribeError::UpstreamStatus(status.as_u16())),
        }
    }
}

#[async_trait]
impl TranscriptService for YouTubeTranscriptClient {
    #[instrument(skip(self, proxy), fields(via_proxy = proxy.is_some()))]
    async fn fetch_transcript(
        &self,
        video_id: &str,
        languages: &[String],
        proxy: Option<&ProxyEndpoint>,
    ) -> Result<Vec<TranscriptSegment>> {
        let client = self.client_for(proxy)?;

        let html = self.fetch_watch_page(&client, video_id).await?;
        let tracks = extract_caption_tracks(&html, video_id)?;
        let track = choose_track(&tracks, languages).ok_or_else(|| {
            ScribeError::NoTranscriptFound {
                video_id: video_id.to_string(),
                languages: languages.to_vec(),
            }
        })?;
        debug!(
            language = %track.language_code,
            generated = track.is_generated(),
            "Selected caption track"
        );

        let body = self.fetch_track(&client, track).await?;
        parse_timed_text(&body)
    }
}

fn build_client(timeout: Duration, proxy: Option<&ProxyEndpoint>) -> Result<Client> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .user_agent(BROWSER_USER_AGENT);

    if let Some(endpoint) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(endpoint.proxy_url()?)?);
    }

    Ok(builder.build()?)
}

/// Pull the caption track list out of the watch page HTML
pub fn extract_caption_tracks(html: &str, video_id: &str) -> Result<Vec<CaptionTrack>> {
    if html.contains(RECAPTCHA_MARKER) {
        return Err(ScribeError::RequestBlocked);
    }

    let disabled = || ScribeError::TranscriptsDisabled {
        video_id: video_id.to_string(),
    };

    let start = html.find(CAPTION_TRACKS_KEY).ok_or_else(disabled)? + CAPTION_TRACKS_KEY.len();
    let tracks = serde_json::Deserializer::from_str(&html[start..])
        .into_iter::<Vec<CaptionTrack>>()
        .next()
        .ok_or_else(disabled)??;

    if tracks.is_empty() {
        return Err(disabled());
    }
    Ok(tracks)
}

/// First track matching the language priority; manual tracks beat generated ones
pub fn choose_track<'a>(
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let matching = || tracks.iter().filter(move |t| t.language_code == *lang);
        matching()
            .find(|t| !t.is_generated())
            .or_else(|| matching().next())
    })
}

/// Convert a `json3` timed-text document into segments
pub fn parse_timed_text(body: &str) -> Result<Vec<TranscriptSegment>> {
    let doc: TimedText = serde_json::from_str(body)?;

    Ok(doc
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.replace('\n', " ");
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment::new(
                event.t_start_ms as f64 / 1000.0,
                event.d_duration_ms as f64 / 1000.0,
                text,
            ))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    const WATCH_HTML: &str = r#"<html><script>var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc123XYZ_0&lang=en&kind=asr","languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc123XYZ_0&lang=en","languageCode":"en"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc123XYZ_0&lang=de","languageCode":"de"}],"audioTracks":[]}}};</script></html>"#;

    #[test]
    fn test_extract_caption_tracks() {
        let tracks = extract_caption_tracks(WATCH_HTML, "abc123XYZ_0").unwrap();
        assert_eq!(tracks.len(), 3);
        assert!(tracks[0].is_generated());
        assert_eq!(
            tracks[1].base_url,
            "https://www.youtube.com/api/timedtext?v=abc123XYZ_0&lang=en"
        );
    }

    #[test]
    fn test_extract_caption_tracks_missing() {
        let err = extract_caption_tracks("<html>no captions</html>", "abc123XYZ_0").unwrap_err();
        assert!(matches!(err, ScribeError::TranscriptsDisabled { .. }));
    }

    #[test]
    fn test_extract_caption_tracks_blocked() {
        let html = r#"<form><div class="g-recaptcha"></div></form>"#;
        let err = extract_caption_tracks(html, "abc123XYZ_0").unwrap_err();
        assert!(matches!(err, ScribeError::RequestBlocked));
    }

    #[test]
    fn test_choose_track_language_priority() {
        let tracks = extract_caption_tracks(WATCH_HTML, "abc123XYZ_0").unwrap();

        // Polish is missing, English manual track wins over generated
        let track = choose_track(&tracks, &langs(&["pl", "en"])).unwrap();
        assert_eq!(track.language_code, "en");
        assert!(!track.is_generated());

        let track = choose_track(&tracks, &langs(&["de", "en"])).unwrap();
        assert_eq!(track.language_code, "de");

        assert!(choose_track(&tracks, &langs(&["pl"])).is_none());
    }

    #[test]
    fn test_choose_track_falls_back_to_generated() {
        let tracks = vec![CaptionTrack {
            base_url: "https://example.invalid/a".into(),
            language_code: "pl".into(),
            kind: Some("asr".into()),
        }];
        let track = choose_track(&tracks, &langs(&["pl", "en"])).unwrap();
        assert!(track.is_generated());
    }

    #[test]
    fn test_parse_timed_text() {
        let body = r#"{"events":[
            {"tStartMs":0,"dDurationMs":1500,"segs":[{"utf8":"Hello "},{"utf8":"there"}]},
            {"tStartMs":1500,"dDurationMs":10},
            {"tStartMs":1600,"dDurationMs":10,"segs":[{"utf8":"\n"}]},
            {"tStartMs":65250,"dDurationMs":2000,"segs":[{"utf8":"second\nline"}]}
        ]}"#;

        let segments = parse_timed_text(body).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], TranscriptSegment::new(0.0, 1.5, "Hello there"));
        assert_eq!(segments[1].start, 65.25);
        assert_eq!(segments[1].text, "second line");
    }

    #[test]
    fn test_parse_timed_text_invalid() {
        assert!(matches!(
            parse_timed_text("not json"),
            Err(ScribeError::Json(_))
        ));
    }
}
