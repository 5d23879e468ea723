//! Declarative agent and task definitions.
//!
//! A crew is described by a TOML document with a table of agents and an
//! ordered array of tasks. Definitions are validated when loaded so the
//! pipeline never has to look up a missing agent or tool at run time.

use crate::error::{Result, ZaaiError};
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Default destination of the final report.
pub const DEFAULT_REPORT_PATH: &str = "assets/report.html";

/// An agent persona, optionally bound to one tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentDefinition {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolKind>,
}

/// How a stage derives the input for its tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputBinding {
    /// No tool input.
    #[default]
    None,
    /// Search query rendered from the run inputs, e.g. `"{{topic}}"`.
    Query {
        template: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
    },
    /// First video URL found in the output of an earlier stage.
    VideoUrl {
        from_stage: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl InputBinding {
    /// The tool this binding produces input for.
    pub fn tool_kind(&self) -> Option<ToolKind> {
        match self {
            InputBinding::None => None,
            InputBinding::Query { .. } => Some(ToolKind::Search),
            InputBinding::VideoUrl { .. } => Some(ToolKind::Transcript),
        }
    }
}

/// One task of the crew; becomes one pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDefinition {
    pub name: String,
    pub agent: String,
    pub description: String,
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(default)]
    pub tool_input: InputBinding,
}

/// The full set of agents and ordered tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewDefinition {
    pub agents: BTreeMap<String, AgentDefinition>,
    pub tasks: Vec<TaskDefinition>,
}

impl Default for CrewDefinition {
    fn default() -> Self {
        let mut agents = BTreeMap::new();
        agents.insert(
            "researcher".to_string(),
            AgentDefinition {
                role: "{{topic}} Senior Video Researcher".to_string(),
                goal: "Find the most relevant and recent YouTube videos about {{topic}}"
                    .to_string(),
                backstory: "You're a seasoned researcher with a knack for uncovering the best \
                    video content on {{topic}}. You know how to tell an in-depth talk from \
                    clickbait and always report the exact video URL."
                    .to_string(),
                tool: Some(ToolKind::Search),
            },
        );
        agents.insert(
            "summarizer".to_string(),
            AgentDefinition {
                role: "{{topic}} Video Summarizer".to_string(),
                goal: "Extract the key ideas from the transcript of a video about {{topic}}"
                    .to_string(),
                backstory: "You're an analyst who turns long spoken content into precise, \
                    well-structured notes without losing the speaker's main arguments."
                    .to_string(),
                tool: Some(ToolKind::Transcript),
            },
        );
        agents.insert(
            "blog_writer".to_string(),
            AgentDefinition {
                role: "{{topic}} Blog Writer".to_string(),
                goal: "Write an engaging blog post about {{topic}} from research and video notes"
                    .to_string(),
                backstory: "You're a technical writer known for clear, approachable articles \
                    that cite their sources."
                    .to_string(),
                tool: None,
            },
        );

        let tasks = vec![
            TaskDefinition {
                name: "research_task".to_string(),
                agent: "researcher".to_string(),
                description: "Search for YouTube videos about {{topic}}. Review the search \
                    results and select the most informative video."
                    .to_string(),
                expected_output: "A short list of the best videos about {{topic}} with title, \
                    URL and one sentence on why each is relevant. Put the best video first."
                    .to_string(),
                tool_input: InputBinding::Query {
                    template: "{{topic}}".to_string(),
                    limit: None,
                },
                output_file: None,
            },
            TaskDefinition {
                name: "summarize_task".to_string(),
                agent: "summarizer".to_string(),
                description: "Summarize the transcript of the selected video about {{topic}}."
                    .to_string(),
                expected_output: "A structured summary with the main points, notable quotes \
                    and the video duration."
                    .to_string(),
                tool_input: InputBinding::VideoUrl {
                    from_stage: "research_task".to_string(),
                    language: None,
                },
                output_file: None,
            },
            TaskDefinition {
                name: "write_task".to_string(),
                agent: "blog_writer".to_string(),
                description: "Write a blog report about {{topic}} using the research and the \
                    video summary."
                    .to_string(),
                expected_output: "A complete, self-contained HTML document with a title, \
                    an introduction, sections for the key points and a link to the video. \
                    Return only the HTML."
                    .to_string(),
                tool_input: InputBinding::None,
                output_file: Some(DEFAULT_REPORT_PATH.to_string()),
            },
        ];

        Self { agents, tasks }
    }
}

impl CrewDefinition {
    /// Load definitions from a TOML file, or the built-in crew if None.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let definition = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Parse and validate definitions from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let definition: CrewDefinition = toml::from_str(content)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Check the structural rules every crew must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(ZaaiError::Definition("crew has no tasks".to_string()));
        }

        let mut seen = HashSet::new();
        let last = self.tasks.len() - 1;

        for (index, task) in self.tasks.iter().enumerate() {
            if !seen.insert(task.name.as_str()) {
                return Err(ZaaiError::Definition(format!(
                    "duplicate task name '{}'",
                    task.name
                )));
            }

            let agent = self.agents.get(&task.agent).ok_or_else(|| {
                ZaaiError::Definition(format!(
                    "task '{}' references unknown agent '{}'",
                    task.name, task.agent
                ))
            })?;

            if let Some(kind) = task.tool_input.tool_kind() {
                if agent.tool != Some(kind) {
                    return Err(ZaaiError::Definition(format!(
                        "task '{}' provides {} input but agent '{}' is not bound to that tool",
                        task.name, kind, task.agent
                    )));
                }
            } else if let Some(kind) = agent.tool {
                return Err(ZaaiError::Definition(format!(
                    "agent '{}' is bound to the {} tool but task '{}' has no tool_input",
                    task.agent, kind, task.name
                )));
            }

            if let InputBinding::Query { limit: Some(0), .. } = task.tool_input {
                return Err(ZaaiError::Definition(format!(
                    "task '{}' requests zero search results",
                    task.name
                )));
            }

            if let InputBinding::VideoUrl { from_stage, .. } = &task.tool_input {
                // Only names inserted so far belong to earlier tasks.
                if from_stage == &task.name || !seen.contains(from_stage.as_str()) {
                    return Err(ZaaiError::Definition(format!(
                        "task '{}' reads from '{}', which is not an earlier task",
                        task.name, from_stage
                    )));
                }
            }

            if task.output_file.is_some() && index != last {
                return Err(ZaaiError::Definition(format!(
                    "only the final task may set output_file (found on '{}')",
                    task.name
                )));
            }
        }

        Ok(())
    }
}
