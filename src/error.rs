//! Error types for zaai.

use thiserror::Error;

/// Library-level error type for zaai operations.
#[derive(Error, Debug)]
pub enum ZaaiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid crew definition: {0}")]
    Definition(String),

    #[error("Malformed video URL (expected a 'v=' parameter): {0}")]
    MalformedUrl(String),

    #[error("Failed to fetch transcript for video '{video_id}': {message}")]
    TranscriptUnavailable { video_id: String, message: String },

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Cannot resolve input for stage '{stage}': {reason}")]
    Binding { stage: String, reason: String },

    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for zaai operations.
pub type Result<T> = std::result::Result<T, ZaaiError>;
