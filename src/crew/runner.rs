//! Sequential crew runner.

use super::context::{resolve_input, RunContext, StageOutput};
use crate::config::{AgentDefinition, CrewDefinition, InputBinding, Settings, StagePrompts};
use crate::error::{Result, ZaaiError};
use crate::llm::{GenerationRequest, Generator};
use crate::tools::{build_tool, is_error_record, Tool, ToolKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// One step of the pipeline: an agent persona, a task and at most one tool.
pub struct Stage {
    pub name: String,
    pub agent: AgentDefinition,
    pub description: String,
    pub expected_output: String,
    pub binding: InputBinding,
    pub tool: Option<Arc<dyn Tool>>,
    pub output_file: Option<PathBuf>,
}

impl Stage {
    /// Create a stage without a tool or destination.
    pub fn new(name: &str, agent: AgentDefinition, description: &str) -> Self {
        Self {
            name: name.to_string(),
            agent,
            description: description.to_string(),
            expected_output: String::new(),
            binding: InputBinding::None,
            tool: None,
            output_file: None,
        }
    }

    /// Bind a tool and the way its input is derived.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>, binding: InputBinding) -> Self {
        self.tool = Some(tool);
        self.binding = binding;
        self
    }

    pub fn with_expected_output(mut self, expected_output: &str) -> Self {
        self.expected_output = expected_output.to_string();
        self
    }

    /// Persist this stage's output to a file.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("tool", &self.tool.as_ref().map(|t| t.name().to_string()))
            .field("output_file", &self.output_file)
            .finish()
    }
}

/// Summary of one executed stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageSummary {
    pub name: String,
    pub tool: Option<String>,
    /// Whether the tool reported an in-band error record.
    pub tool_reported_error: bool,
    pub output_chars: usize,
}

/// Result of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stages: Vec<StageSummary>,
    /// Where the final output was written, if the final stage has a destination.
    pub artifact: Option<PathBuf>,
    /// Output of the final stage.
    pub output: String,
}

/// An ordered list of stages executed one after another.
pub struct Crew {
    stages: Vec<Stage>,
    generator: Arc<dyn Generator>,
    prompts: StagePrompts,
}

impl Crew {
    /// Create a crew from stages. Only the final stage may have an output file.
    pub fn new(stages: Vec<Stage>, generator: Arc<dyn Generator>) -> Result<Self> {
        let Some(last) = stages.len().checked_sub(1) else {
            return Err(ZaaiError::Definition("crew has no stages".to_string()));
        };

        if let Some(stage) = stages[..last].iter().find(|s| s.output_file.is_some()) {
            return Err(ZaaiError::Definition(format!(
                "only the final stage may set an output file (found on '{}')",
                stage.name
            )));
        }

        if let Some(stage) = stages
            .iter()
            .find(|s| s.tool.is_some() != s.binding.tool_kind().is_some())
        {
            return Err(ZaaiError::Definition(format!(
                "stage '{}' must have both a tool and a tool input, or neither",
                stage.name
            )));
        }

        Ok(Self {
            stages,
            generator,
            prompts: StagePrompts::default(),
        })
    }

    /// Build a crew from validated definitions, constructing one adapter per tool kind.
    pub fn from_definition(
        definition: &CrewDefinition,
        settings: &Settings,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        definition.validate()?;

        let mut tools: HashMap<ToolKind, Arc<dyn Tool>> = HashMap::new();
        let mut stages = Vec::with_capacity(definition.tasks.len());

        for task in &definition.tasks {
            let agent = definition.agents.get(&task.agent).cloned().ok_or_else(|| {
                ZaaiError::Definition(format!("unknown agent '{}'", task.agent))
            })?;

            let mut stage = Stage::new(&task.name, agent.clone(), &task.description)
                .with_expected_output(&task.expected_output);

            if let Some(kind) = agent.tool {
                let tool = match tools.get(&kind) {
                    Some(tool) => tool.clone(),
                    None => {
                        let tool = build_tool(kind, settings)?;
                        tools.insert(kind, tool.clone());
                        tool
                    }
                };
                stage = stage.with_tool(tool, task.tool_input.clone());
            }

            if let Some(path) = &task.output_file {
                stage = stage.with_output_file(Settings::expand_path(path));
            }

            stages.push(stage);
        }

        Self::new(stages, generator)
    }

    /// Use custom prompt templates.
    pub fn with_prompts(mut self, prompts: StagePrompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Redirect the final stage's output to another file.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        if let Some(last) = self.stages.last_mut() {
            last.output_file = Some(path.into());
        }
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order.
    pub async fn run(&self, inputs: &BTreeMap<String, String>) -> Result<RunReport> {
        self.run_with_progress(inputs, |_, _, _| {}).await
    }

    /// Run every stage in order, reporting each stage before it starts.
    ///
    /// The first failing stage aborts the run and its error is returned as is.
    #[instrument(skip(self, inputs, on_stage), fields(run_id = tracing::field::Empty))]
    pub async fn run_with_progress<F>(
        &self,
        inputs: &BTreeMap<String, String>,
        mut on_stage: F,
    ) -> Result<RunReport>
    where
        F: FnMut(usize, usize, &str),
    {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        let started_at = Utc::now();
        let total = self.stages.len();

        info!("Starting crew run with {} stages", total);

        let mut context = RunContext::new(inputs.clone());
        let mut summaries = Vec::with_capacity(total);

        for (index, stage) in self.stages.iter().enumerate() {
            on_stage(index + 1, total, &stage.name);
            info!("[{}/{}] Running stage '{}'", index + 1, total, stage.name);

            let output = self.run_stage(stage, &context).await.inspect_err(|e| {
                warn!("Stage '{}' failed, aborting run: {}", stage.name, e);
            })?;

            summaries.push(StageSummary {
                name: stage.name.clone(),
                tool: output.tool.clone(),
                tool_reported_error: output
                    .tool_output
                    .as_ref()
                    .and_then(|v| v.as_array())
                    .is_some_and(|records| records.iter().any(is_error_record)),
                output_chars: output.text.chars().count(),
            });
            context.push(stage.name.clone(), output);
        }

        let output = context
            .outputs()
            .last()
            .map(|(_, o)| o.text.clone())
            .unwrap_or_default();

        let artifact = match self.stages.last().and_then(|s| s.output_file.as_ref()) {
            Some(path) => {
                write_artifact(path, &output)?;
                info!("Wrote report to {}", path.display());
                Some(path.clone())
            }
            None => None,
        };

        Ok(RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            stages: summaries,
            artifact,
            output,
        })
    }

    async fn run_stage(&self, stage: &Stage, context: &RunContext) -> Result<StageOutput> {
        let tool_output = match (&stage.tool, resolve_input(&stage.binding, &stage.name, context)?)
        {
            (Some(tool), Some(input)) => {
                debug!("Invoking {} with {}", tool.name(), input);
                let output = tool.invoke(input).await?;

                if output
                    .as_array()
                    .is_some_and(|records| records.iter().any(is_error_record))
                {
                    warn!(
                        "Tool {} reported an error record; stage '{}' continues with it",
                        tool.name(),
                        stage.name
                    );
                }
                Some(output)
            }
            (None, None) => None,
            _ => {
                return Err(ZaaiError::Binding {
                    stage: stage.name.clone(),
                    reason: "tool and tool input do not match".to_string(),
                })
            }
        };

        let request = self.build_request(stage, context, tool_output.as_ref())?;
        let text = self.generator.generate(&request).await?;

        Ok(StageOutput {
            text,
            tool: stage.tool.as_ref().map(|t| t.name().to_string()),
            tool_output,
        })
    }

    fn build_request(
        &self,
        stage: &Stage,
        context: &RunContext,
        tool_output: Option<&serde_json::Value>,
    ) -> Result<GenerationRequest> {
        let mut vars = HashMap::new();
        vars.insert("role".to_string(), context.render(&stage.agent.role));
        vars.insert("goal".to_string(), context.render(&stage.agent.goal));
        vars.insert("backstory".to_string(), context.render(&stage.agent.backstory));
        vars.insert("description".to_string(), context.render(&stage.description));
        vars.insert(
            "expected_output".to_string(),
            context.render(&stage.expected_output),
        );
        vars.insert("context".to_string(), format_context(context));

        let tool_section = match (&stage.tool, tool_output) {
            (Some(tool), Some(output)) => format!(
                "\nResult of the {} tool ({}):\n```json\n{}\n```\n",
                tool.name(),
                tool.description(),
                serde_json::to_string_pretty(output)?
            ),
            _ => String::new(),
        };
        vars.insert("tool_section".to_string(), tool_section);

        Ok(GenerationRequest {
            stage: stage.name.clone(),
            system: StagePrompts::render(&self.prompts.system, &vars),
            user: StagePrompts::render(&self.prompts.user, &vars),
        })
    }
}

/// Format prior stage outputs for the next prompt.
fn format_context(context: &RunContext) -> String {
    if context.outputs().is_empty() {
        return String::new();
    }

    let sections = context
        .outputs()
        .iter()
        .map(|(name, output)| format!("### {}\n{}", name, output.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("\nContext from previous tasks:\n\n{}\n", sections)
}

/// Remove a Markdown code fence wrapped around a whole document.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text;
    };
    let Some((_, body)) = rest.split_once('\n') else {
        return text;
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn write_artifact(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, strip_code_fence(content))?;
    Ok(())
}
