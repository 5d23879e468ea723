//! Transcript command implementation.

use crate::cli::output::format_duration;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::{YoutubeTranscriptApi, YoutubeTranscriptTool};
use anyhow::Result;
use std::sync::Arc;

/// Fetch and print a video transcript.
pub async fn run_transcript(
    url: &str,
    language: Option<String>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Transcript, &settings)?;

    let api = Arc::new(YoutubeTranscriptApi::new(&settings.transcript)?);
    let tool = YoutubeTranscriptTool::new(api, &settings.transcript.default_language);

    let spinner = Output::spinner("Fetching transcript...");
    let result = tool.fetch_transcript(url, language.as_deref()).await;
    spinner.finish_and_clear();

    let transcript = match result {
        Ok(t) => t,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&transcript)?);
    } else {
        Output::kv("Duration", &format_duration(transcript.duration_seconds));
        println!("\n{}\n", transcript.transcript);
    }

    Ok(())
}
