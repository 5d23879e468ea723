//! Configuration settings for zaai.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Environment variable holding the SearXNG base URL.
pub const SEARXNG_BASE_URL_ENV: &str = "SEARXNG_BASE_URL";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub transcript: TranscriptSettings,
    pub llm: LlmSettings,
    pub crew: CrewSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// SearXNG metasearch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Base URL of the SearXNG instance. Overridden by `SEARXNG_BASE_URL`.
    pub base_url: Option<String>,
    /// Disable TLS certificate verification for the search instance.
    pub insecure: bool,
    /// Default number of results requested.
    pub result_limit: u32,
    /// Filter appended to every query.
    pub site_filter: String,
    pub categories: String,
    pub engines: String,
    pub language: String,
    /// SafeSearch level (0 = off, 1 = moderate, 2 = strict).
    pub safesearch: u8,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            insecure: false,
            result_limit: 10,
            site_filter: ":youtube".to_string(),
            categories: "general".to_string(),
            engines: "google".to_string(),
            language: "en".to_string(),
            safesearch: 1,
        }
    }
}

/// YouTube transcript settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Base URL used to fetch watch pages.
    pub base_url: String,
    /// Language requested when none is given explicitly.
    pub default_language: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            default_language: "en".to_string(),
        }
    }
}

/// Text generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat model used by every stage.
    pub model: String,
    pub temperature: f32,
    /// Alternative OpenAI-compatible endpoint.
    pub api_base: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            api_base: None,
        }
    }
}

/// Crew definition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct CrewSettings {
    /// Path to a TOML file with agent and task definitions. Built-in defaults when unset.
    pub definitions: Option<String>,
    /// Directory holding a custom `stage.toml` prompt file.
    pub prompts_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied once here; nothing reads the
    /// environment after loading.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            debug!("No config at {:?}, using defaults", config_path);
            Settings::default()
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(SEARXNG_BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.search.base_url = Some(url);
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ZaaiError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("zaai")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded crew definitions path, if configured.
    pub fn definitions_path(&self) -> Option<PathBuf> {
        self.crew.definitions.as_deref().map(Self::expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_search_contract() {
        let settings = Settings::default();
        assert_eq!(settings.search.result_limit, 10);
        assert_eq!(settings.search.site_filter, ":youtube");
        assert_eq!(settings.search.engines, "google");
        assert!(!settings.search.insecure);
        assert_eq!(settings.transcript.default_language, "en");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [search]
            base_url = "https://searx.local"
            insecure = true

            [llm]
            model = "gpt-4.1"
            "#,
        )
        .unwrap();

        assert_eq!(settings.search.base_url.as_deref(), Some("https://searx.local"));
        assert!(settings.search.insecure);
        assert_eq!(settings.search.result_limit, 10);
        assert_eq!(settings.llm.model, "gpt-4.1");
        assert_eq!(settings.llm.temperature, 0.7);
    }

    #[test]
    fn test_env_override_replaces_base_url() {
        let mut settings = Settings::default();
        settings.search.base_url = Some("https://from-file".to_string());

        settings.apply_env_overrides(|key| {
            (key == SEARXNG_BASE_URL_ENV).then(|| "https://from-env".to_string())
        });
        assert_eq!(settings.search.base_url.as_deref(), Some("https://from-env"));

        settings.apply_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(settings.search.base_url.as_deref(), Some("https://from-env"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.crew.definitions = Some("~/crew.toml".to_string());
        settings.save_to(&path).unwrap();

        let loaded: Settings = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.crew.definitions.as_deref(), Some("~/crew.toml"));
        assert!(loaded.definitions_path().is_some());
    }
}
