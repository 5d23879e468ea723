//! Pre-flight checks before network-bound operations.
//!
//! Validates that required configuration is available before starting
//! a run that would otherwise fail midway.

use crate::config::{Settings, SEARXNG_BASE_URL_ENV};
use crate::error::{Result, ZaaiError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// A full crew run needs the search instance and a model API key.
    Run,
    /// A direct search needs the search instance.
    Search,
    /// Transcript fetching has no configuration requirements.
    Transcript,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    check_with(operation, settings, |key| std::env::var(key).ok())
}

fn check_with<F>(operation: Operation, settings: &Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    match operation {
        Operation::Run => {
            check_search_url(settings)?;
            // A custom endpoint may not need a key.
            if settings.llm.api_base.is_none() {
                check_api_key(lookup)?;
            }
        }
        Operation::Search => {
            check_search_url(settings)?;
        }
        Operation::Transcript => {}
    }
    Ok(())
}

fn check_search_url(settings: &Settings) -> Result<()> {
    match settings.search.base_url.as_deref() {
        Some(url) if !url.trim().is_empty() => Ok(()),
        _ => Err(ZaaiError::Config(format!(
            "No search instance configured. Set {} or search.base_url in the config file.",
            SEARXNG_BASE_URL_ENV
        ))),
    }
}

/// Check if OpenAI API key is configured.
fn check_api_key<F>(lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("OPENAI_API_KEY") {
        Some(key) if !key.is_empty() => Ok(()),
        Some(_) => Err(ZaaiError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        None => Err(ZaaiError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
