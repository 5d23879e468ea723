//! CLI command implementations.

mod config;
mod run;
mod search;
mod stages;
mod transcript;

pub use config::run_config;
pub use run::run_pipeline;
pub use search::run_search;
pub use stages::run_stages;
pub use transcript::run_transcript;

use crate::config::{CrewDefinition, Settings};
use std::path::PathBuf;

/// Load crew definitions from an explicit path, the configured path, or the built-in crew.
fn load_crew(explicit: Option<&str>, settings: &Settings) -> crate::Result<CrewDefinition> {
    let path: Option<PathBuf> = explicit
        .map(Settings::expand_path)
        .or_else(|| settings.definitions_path());
    CrewDefinition::load(path.as_deref())
}
