//! Configuration module for zaai.
//!
//! Handles application settings, crew definitions and stage prompt templates.

mod crew;
mod prompts;
mod settings;

pub use crew::{
    AgentDefinition, CrewDefinition, InputBinding, TaskDefinition, DEFAULT_REPORT_PATH,
};
pub use prompts::StagePrompts;
pub use settings::{
    CrewSettings, GeneralSettings, LlmSettings, SearchSettings, Settings, TranscriptSettings,
    SEARXNG_BASE_URL_ENV,
};
