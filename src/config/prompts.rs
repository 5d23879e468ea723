//! Prompt templates for pipeline stages.
//!
//! Prompts can be customized by placing a `stage.toml` file in a custom directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

/// Templates used to turn a stage into a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagePrompts {
    pub system: String,
    pub user: String,
}

impl Default for StagePrompts {
    fn default() -> Self {
        Self {
            system: r#"You are {{role}}.
{{backstory}}

Your personal goal is: {{goal}}"#
                .to_string(),

            user: r#"Current task: {{description}}

This is the expected criteria for your final answer: {{expected_output}}
{{context}}{{tool_section}}
Respond with the final answer only."#
                .to_string(),
        }
    }
}

impl StagePrompts {
    /// Load prompts from a custom directory, falling back to the defaults.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        if let Some(dir) = custom_dir {
            let path = PathBuf::from(shellexpand::tilde(dir).to_string()).join("stage.toml");
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                return Ok(toml::from_str(&content)?);
            }
        }
        Ok(Self::default())
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in a single pass, so substituted values
    /// are never expanded again. Unknown placeholders are left in place.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}
