//! Transcript upstream backed by YouTube's caption tracks.
//!
//! The watch page embeds the player response, whose `captions` section lists
//! one track per language. Each track points at a timed-text XML document
//! with `<text start=".." dur="..">` elements.

use super::transcript::{TranscriptApi, TranscriptApiError, TranscriptSegment};
use crate::config::TranscriptSettings;
use crate::error::{Result, ZaaiError};
use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, instrument};

static TEXT_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b([^>]*)>(.*?)</text>").expect("Invalid regex"));

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).expect("Invalid regex"));

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
}

/// Fetches transcripts from YouTube watch pages.
pub struct YoutubeTranscriptApi {
    client: reqwest::Client,
    base_url: String,
}

impl YoutubeTranscriptApi {
    pub fn new(settings: &TranscriptSettings) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_watch_page(&self, video_id: &str) -> Result<String> {
        let url = format!("{}/watch", self.base_url);
        let html = self
            .client
            .get(&url)
            .query(&[("v", video_id)])
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(html)
    }

    async fn fetch_timed_text(&self, track: &CaptionTrack) -> Result<String> {
        let url = track.base_url.replace("&fmt=srv3", "");
        let xml = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(xml)
    }
}

#[async_trait]
impl TranscriptApi for YoutubeTranscriptApi {
    #[instrument(skip(self))]
    async fn fetch_segments(
        &self,
        video_id: &str,
        language: &str,
    ) -> std::result::Result<Vec<TranscriptSegment>, TranscriptApiError> {
        let html = self.fetch_watch_page(video_id).await?;
        let tracks = caption_tracks(&html, video_id)?;

        let track = tracks
            .iter()
            .find(|t| t.language_code == language)
            .ok_or_else(|| TranscriptApiError::NoTranscriptFound {
                language: language.to_string(),
                available: tracks.iter().map(|t| t.language_code.clone()).collect(),
            })?;

        debug!("Using caption track {} for {}", track.language_code, video_id);

        let xml = self.fetch_timed_text(track).await?;
        Ok(parse_timed_text(&xml))
    }
}

/// Read the caption track list from a watch page.
fn caption_tracks(
    html: &str,
    video_id: &str,
) -> std::result::Result<Vec<CaptionTrack>, TranscriptApiError> {
    let Some((_, after)) = html.split_once("\"captions\":") else {
        if html.contains("class=\"g-recaptcha\"") {
            return Err(ZaaiError::Upstream(format!(
                "YouTube is rate limiting requests (captcha) for video '{}'",
                video_id
            ))
            .into());
        }
        if !html.contains("\"playabilityStatus\":") {
            return Err(ZaaiError::Upstream(format!("video '{}' is unavailable", video_id)).into());
        }
        return Err(TranscriptApiError::TranscriptsDisabled);
    };

    // The captions object is followed by more player JSON; only the first value is read.
    let captions: Captions = serde_json::Deserializer::from_str(after)
        .into_iter::<Captions>()
        .next()
        .ok_or_else(|| ZaaiError::Upstream("empty captions section".to_string()))?
        .map_err(ZaaiError::from)?;

    let tracks = captions
        .player_captions_tracklist_renderer
        .map(|r| r.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(TranscriptApiError::TranscriptsDisabled);
    }
    Ok(tracks)
}

/// Parse timed-text XML into segments, skipping empty elements.
fn parse_timed_text(xml: &str) -> Vec<TranscriptSegment> {
    TEXT_ELEMENT
        .captures_iter(xml)
        .filter_map(|caps| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let mut start = 0.0;
            let mut duration = 0.0;
            for attr in ATTRIBUTE.captures_iter(attrs) {
                let value = attr[2].parse::<f64>().unwrap_or(0.0);
                match &attr[1] {
                    "start" => start = value,
                    "dur" => duration = value,
                    _ => {}
                }
            }

            // Caption text is escaped twice: once by XML, once as HTML.
            let raw = caps.get(2).map_or("", |m| m.as_str());
            let text = fragment_text(&fragment_text(raw)).trim().to_string();

            (!text.is_empty()).then_some(TranscriptSegment {
                text,
                start_seconds: start,
                duration_seconds: duration,
            })
        })
        .collect()
}

/// Text content of an HTML fragment, with tags dropped and entities decoded.
fn fragment_text(input: &str) -> String {
    Html::parse_fragment(input)
        .root_element()
        .text()
        .collect()
}
