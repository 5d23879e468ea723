//! Run context and tool input resolution.

use crate::config::{InputBinding, StagePrompts};
use crate::error::{Result, ZaaiError};
use crate::tools::extract_video_id;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://(?:www\.|m\.)?youtube\.com/watch\?[^\s"'<>()\[\]]+"#)
        .expect("Invalid regex")
});

/// Output of one completed stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutput {
    /// Text produced by the generator.
    pub text: String,
    /// Name of the tool the stage invoked, if any.
    pub tool: Option<String>,
    /// Raw tool output, if a tool was invoked.
    pub tool_output: Option<Value>,
}

/// Everything known so far in a run: the initial inputs plus prior stage outputs.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    inputs: BTreeMap<String, String>,
    outputs: Vec<(String, StageOutput)>,
}

impl RunContext {
    pub fn new(inputs: BTreeMap<String, String>) -> Self {
        Self {
            inputs,
            outputs: Vec::new(),
        }
    }

    pub fn inputs(&self) -> &BTreeMap<String, String> {
        &self.inputs
    }

    /// Completed stages in execution order.
    pub fn outputs(&self) -> &[(String, StageOutput)] {
        &self.outputs
    }

    /// Output of a named stage, if it has run.
    pub fn output(&self, stage: &str) -> Option<&StageOutput> {
        self.outputs
            .iter()
            .find(|(name, _)| name == stage)
            .map(|(_, output)| output)
    }

    pub(crate) fn push(&mut self, stage: String, output: StageOutput) {
        self.outputs.push((stage, output));
    }

    /// Render a `{{var}}` template against the initial inputs.
    pub fn render(&self, template: &str) -> String {
        let vars: HashMap<String, String> = self
            .inputs
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        StagePrompts::render(template, &vars)
    }
}

/// Resolve the tool input a stage's binding asks for.
pub fn resolve_input(
    binding: &InputBinding,
    stage: &str,
    context: &RunContext,
) -> Result<Option<Value>> {
    match binding {
        InputBinding::None => Ok(None),

        InputBinding::Query { template, limit } => {
            let query = context.render(template);
            if query.contains("{{") {
                return Err(ZaaiError::Binding {
                    stage: stage.to_string(),
                    reason: format!("unresolved placeholder in query template '{}'", template),
                });
            }
            if query.trim().is_empty() {
                return Err(ZaaiError::Binding {
                    stage: stage.to_string(),
                    reason: "search query is empty".to_string(),
                });
            }
            Ok(Some(json!({ "query": query.trim(), "num_results": limit })))
        }

        InputBinding::VideoUrl {
            from_stage,
            language,
        } => {
            let source = context.output(from_stage).ok_or_else(|| ZaaiError::Binding {
                stage: stage.to_string(),
                reason: format!("stage '{}' has not run", from_stage),
            })?;
            let url = find_video_url(source).ok_or_else(|| ZaaiError::Binding {
                stage: stage.to_string(),
                reason: format!("no YouTube video URL in the output of '{}'", from_stage),
            })?;
            Ok(Some(json!({ "video_url": url, "language": language })))
        }
    }
}

/// Find the first usable video URL in a stage output.
///
/// The generated text is checked first, then the `url` fields of the tool's
/// records.
pub fn find_video_url(output: &StageOutput) -> Option<String> {
    let from_text = VIDEO_URL
        .find_iter(&output.text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!']))
        .find(|url| is_video_url(url));

    if let Some(url) = from_text {
        return Some(url.to_string());
    }

    output
        .tool_output
        .as_ref()
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|record| record.get("url").and_then(Value::as_str))
        .find(|url| is_video_url(url))
        .map(str::to_string)
}

fn is_video_url(url: &str) -> bool {
    VIDEO_URL.is_match(url) && extract_video_id(url).is_ok()
}
