//! Tool adapters available to pipeline stages.
//!
//! Every adapter implements [`Tool`]: a name, a description, and a single
//! `invoke` call taking and returning JSON. Stages pick their tool by
//! [`ToolKind`] when the crew is built.

mod search;
mod transcript;
mod youtube;

pub use search::{is_error_record, SearchQuery, SearxSearchTool, DEFAULT_RESULT_LIMIT};
pub use transcript::{
    aggregate_segments, extract_video_id, TranscriptApi, TranscriptApiError, TranscriptResult,
    TranscriptSegment, YoutubeTranscriptTool,
};
pub use youtube::YoutubeTranscriptApi;

use crate::config::Settings;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The adapters a stage can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// SearXNG metasearch.
    Search,
    /// YouTube transcript extraction.
    Transcript,
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolKind::Search => write!(f, "search"),
            ToolKind::Transcript => write!(f, "transcript"),
        }
    }
}

impl std::str::FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "search" | "searx" => Ok(ToolKind::Search),
            "transcript" | "youtube" => Ok(ToolKind::Transcript),
            _ => Err(format!("Unknown tool: {}", s)),
        }
    }
}

/// A capability a stage can invoke once per run.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable tool name, used in logs and prompts.
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Run the tool with JSON input and return JSON output.
    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value>;
}

/// Construct the adapter for a tool kind from settings.
pub fn build_tool(kind: ToolKind, settings: &Settings) -> Result<Arc<dyn Tool>> {
    match kind {
        ToolKind::Search => Ok(Arc::new(SearxSearchTool::new(&settings.search)?)),
        ToolKind::Transcript => {
            let api = Arc::new(YoutubeTranscriptApi::new(&settings.transcript)?);
            Ok(Arc::new(YoutubeTranscriptTool::new(
                api,
                &settings.transcript.default_language,
            )))
        }
    }
}
