//! YouTube transcript adapter.

use super::Tool;
use crate::error::{Result, ZaaiError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

/// One timed piece of a transcript, in upstream order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

/// Aggregated transcript of a whole video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub transcript: String,
    pub duration_seconds: f64,
}

/// Errors reported by a transcript upstream.
#[derive(Debug, Error)]
pub enum TranscriptApiError {
    #[error("No transcript found in language '{language}' (available: {available:?})")]
    NoTranscriptFound {
        language: String,
        available: Vec<String>,
    },

    #[error("Subtitles are disabled for this video")]
    TranscriptsDisabled,

    #[error(transparent)]
    Other(#[from] ZaaiError),
}

impl From<reqwest::Error> for TranscriptApiError {
    fn from(e: reqwest::Error) -> Self {
        TranscriptApiError::Other(ZaaiError::Http(e))
    }
}

/// Source of transcript segments for a video.
#[async_trait]
pub trait TranscriptApi: Send + Sync {
    /// Fetch the segments of a video's transcript in the given language.
    async fn fetch_segments(
        &self,
        video_id: &str,
        language: &str,
    ) -> std::result::Result<Vec<TranscriptSegment>, TranscriptApiError>;
}

/// Extract the video ID from a URL's `v=` parameter.
///
/// The ID runs from the first `v=` to the next `&` or `#`.
pub fn extract_video_id(url: &str) -> Result<String> {
    let (_, rest) = url
        .split_once("v=")
        .ok_or_else(|| ZaaiError::MalformedUrl(url.to_string()))?;

    let id = rest.split(['&', '#']).next().unwrap_or_default().trim();
    if id.is_empty() {
        return Err(ZaaiError::MalformedUrl(url.to_string()));
    }

    Ok(id.to_string())
}

/// Join segment texts with single spaces and sum their durations.
pub fn aggregate_segments(segments: &[TranscriptSegment]) -> TranscriptResult {
    let transcript = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let duration_seconds = segments.iter().map(|s| s.duration_seconds).sum();

    TranscriptResult {
        transcript,
        duration_seconds,
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptInput {
    video_url: String,
    #[serde(default)]
    language: Option<String>,
}

/// Fetches and flattens the transcript of a YouTube video.
pub struct YoutubeTranscriptTool {
    api: Arc<dyn TranscriptApi>,
    default_language: String,
}

impl YoutubeTranscriptTool {
    /// Create a transcript tool backed by the given upstream.
    pub fn new(api: Arc<dyn TranscriptApi>, default_language: &str) -> Self {
        Self {
            api,
            default_language: default_language.to_string(),
        }
    }

    /// Fetch the transcript of a video URL, optionally in a given language.
    #[instrument(skip(self))]
    pub async fn fetch_transcript(
        &self,
        video_url: &str,
        language: Option<&str>,
    ) -> Result<TranscriptResult> {
        let video_id = extract_video_id(video_url)?;
        let language = language
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.default_language);

        let segments = self
            .api
            .fetch_segments(&video_id, language)
            .await
            .map_err(|e| match e {
                TranscriptApiError::NoTranscriptFound { .. }
                | TranscriptApiError::TranscriptsDisabled => ZaaiError::TranscriptUnavailable {
                    message: e.to_string(),
                    video_id: video_id.clone(),
                },
                TranscriptApiError::Other(inner) => inner,
            })?;

        let result = aggregate_segments(&segments);
        info!(
            "Transcript for {}: {} segments, {:.0}s",
            video_id,
            segments.len(),
            result.duration_seconds
        );
        Ok(result)
    }
}

#[async_trait]
impl Tool for YoutubeTranscriptTool {
    fn name(&self) -> &str {
        "youtube_transcript_tool"
    }

    fn description(&self) -> &str {
        "A tool to perform youtube transcript extraction. Specify the url of the \
         youtube video and optionally the language code."
    }

    async fn invoke(&self, input: Value) -> Result<Value> {
        let input: TranscriptInput = serde_json::from_value(input)
            .map_err(|e| ZaaiError::InvalidInput(format!("transcript input: {}", e)))?;
        let result = self
            .fetch_transcript(&input.video_url, input.language.as_deref())
            .await?;
        Ok(serde_json::to_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn segment(text: &str, duration: f64) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            start_seconds: 0.0,
            duration_seconds: duration,
        }
    }

    /// Upstream that replays a canned outcome and records requests.
    struct FakeApi {
        outcome: fn() -> std::result::Result<Vec<TranscriptSegment>, TranscriptApiError>,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl FakeApi {
        fn new(
            outcome: fn() -> std::result::Result<Vec<TranscriptSegment>, TranscriptApiError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TranscriptApi for FakeApi {
        async fn fetch_segments(
            &self,
            video_id: &str,
            language: &str,
        ) -> std::result::Result<Vec<TranscriptSegment>, TranscriptApiError> {
            self.requests
                .lock()
                .unwrap()
                .push((video_id.to_string(), language.to_string()));
            (self.outcome)()
        }
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=abc_-1#top").unwrap(),
            "abc_-1"
        );
    }

    #[test]
    fn test_extract_video_id_malformed() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=",
            "https://www.youtube.com/watch?v=&t=1",
            "",
        ] {
            assert!(
                matches!(extract_video_id(url), Err(ZaaiError::MalformedUrl(_))),
                "expected MalformedUrl for {:?}",
                url
            );
        }
    }

    #[test]
    fn test_aggregate_segments() {
        let result = aggregate_segments(&[segment("a", 1.0), segment("b", 2.0)]);
        assert_eq!(result.transcript, "a b");
        assert_eq!(result.duration_seconds, 3.0);

        let empty = aggregate_segments(&[]);
        assert_eq!(empty.transcript, "");
        assert_eq!(empty.duration_seconds, 0.0);
    }

    #[tokio::test]
    async fn test_fetch_uses_default_language() {
        let api = FakeApi::new(|| Ok(vec![segment("hello", 1.5), segment("world", 2.5)]));
        let tool = YoutubeTranscriptTool::new(api.clone(), "en");

        let result = tool
            .fetch_transcript("https://www.youtube.com/watch?v=abc123", None)
            .await
            .unwrap();
        assert_eq!(result.transcript, "hello world");
        assert_eq!(result.duration_seconds, 4.0);

        tool.fetch_transcript("https://www.youtube.com/watch?v=abc123", Some("de"))
            .await
            .unwrap();

        let requests = api.requests.lock().unwrap();
        assert_eq!(requests[0], ("abc123".to_string(), "en".to_string()));
        assert_eq!(requests[1], ("abc123".to_string(), "de".to_string()));
    }

    #[tokio::test]
    async fn test_disabled_becomes_unavailable() {
        let api = FakeApi::new(|| Err(TranscriptApiError::TranscriptsDisabled));
        let tool = YoutubeTranscriptTool::new(api, "en");

        let err = tool
            .fetch_transcript("https://www.youtube.com/watch?v=abc123", None)
            .await
            .unwrap_err();
        match err {
            ZaaiError::TranscriptUnavailable { video_id, message } => {
                assert_eq!(video_id, "abc123");
                assert!(message.contains("disabled"));
            }
            other => panic!("Expected TranscriptUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_transcript_becomes_unavailable() {
        let api = FakeApi::new(|| {
            Err(TranscriptApiError::NoTranscriptFound {
                language: "fr".to_string(),
                available: vec!["en".to_string()],
            })
        });
        let tool = YoutubeTranscriptTool::new(api, "en");

        let err = tool
            .fetch_transcript("https://www.youtube.com/watch?v=xyz", Some("fr"))
            .await
            .unwrap_err();
        match err {
            ZaaiError::TranscriptUnavailable { video_id, .. } => assert_eq!(video_id, "xyz"),
            other => panic!("Expected TranscriptUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_errors_propagate_unchanged() {
        let api = FakeApi::new(|| {
            Err(TranscriptApiError::Other(ZaaiError::Upstream(
                "video unavailable".to_string(),
            )))
        });
        let tool = YoutubeTranscriptTool::new(api, "en");

        let err = tool
            .fetch_transcript("https://www.youtube.com/watch?v=xyz", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ZaaiError::Upstream(ref m) if m == "video unavailable"));
    }

    #[tokio::test]
    async fn test_malformed_url_skips_upstream() {
        let api = FakeApi::new(|| Ok(Vec::new()));
        let tool = YoutubeTranscriptTool::new(api.clone(), "en");

        let err = tool.fetch_transcript("not a url", None).await.unwrap_err();
        assert!(matches!(err, ZaaiError::MalformedUrl(_)));
        assert!(api.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_output_shape() {
        let api = FakeApi::new(|| Ok(vec![segment("a", 1.0), segment("b", 2.0)]));
        let tool = YoutubeTranscriptTool::new(api, "en");

        let output = tool
            .invoke(json!({ "video_url": "https://www.youtube.com/watch?v=abc" }))
            .await
            .unwrap();
        assert_eq!(output, json!({ "transcript": "a b", "duration_seconds": 3.0 }));
    }

    #[tokio::test]
    async fn test_repeated_fetch_is_identical() {
        let api = FakeApi::new(|| Ok(vec![segment("one", 1.25), segment("two", 0.75)]));
        let tool = YoutubeTranscriptTool::new(api, "en");
        let url = "https://www.youtube.com/watch?v=abc";

        let first = tool.fetch_transcript(url, None).await.unwrap();
        let second = tool.fetch_transcript(url, None).await.unwrap();
        assert_eq!(first, second);
    }
}
