//! Stages command implementation.

use super::load_crew;
use crate::cli::Output;
use crate::config::{InputBinding, Settings};
use anyhow::Result;

/// List the configured stages in execution order.
pub fn run_stages(crew_path: Option<String>, settings: &Settings) -> Result<()> {
    let definition = load_crew(crew_path.as_deref(), settings)?;

    Output::header(&format!("Stages ({})", definition.tasks.len()));
    for (i, task) in definition.tasks.iter().enumerate() {
        let tool = definition
            .agents
            .get(&task.agent)
            .and_then(|a| a.tool)
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!();
        Output::list_item(&format!(
            "{}. {} (agent: {}, tool: {})",
            i + 1,
            task.name,
            task.agent,
            tool
        ));

        match &task.tool_input {
            InputBinding::None => {}
            InputBinding::Query { template, .. } => Output::kv("query", template),
            InputBinding::VideoUrl { from_stage, .. } => Output::kv("video from", from_stage),
        }
        if let Some(path) = &task.output_file {
            Output::kv("writes", path);
        }
    }
    println!();

    Ok(())
}
