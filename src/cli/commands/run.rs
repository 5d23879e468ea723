//! Run command implementation.

use super::load_crew;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Settings, StagePrompts};
use crate::crew::Crew;
use crate::llm::OpenAIGenerator;
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Run the full pipeline for a topic.
pub async fn run_pipeline(
    topic: &str,
    output: Option<String>,
    crew_path: Option<String>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Run, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let definition = load_crew(crew_path.as_deref(), &settings)?;
    let prompts = StagePrompts::load(settings.crew.prompts_dir.as_deref())?;
    let generator = Arc::new(OpenAIGenerator::new(&settings.llm)?);

    let mut crew = Crew::from_definition(&definition, &settings, generator)?.with_prompts(prompts);
    if let Some(path) = output {
        crew = crew.with_output_file(Settings::expand_path(&path));
    }

    let mut inputs = BTreeMap::new();
    inputs.insert("topic".to_string(), topic.to_string());

    Output::info(&format!("Running crew for topic: {}", topic));
    let spinner = Output::spinner("Starting...");

    let result = crew
        .run_with_progress(&inputs, |index, total, name| {
            spinner.set_message(format!("[{}/{}] {}", index, total, name));
        })
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            Output::header("Stages");
            for stage in &report.stages {
                let tool = stage.tool.as_deref().unwrap_or("-");
                let note = if stage.tool_reported_error {
                    " (tool reported an error)"
                } else {
                    ""
                };
                Output::list_item(&format!(
                    "{} [{}] {} chars{}",
                    stage.name, tool, stage.output_chars, note
                ));
            }
            println!();

            match &report.artifact {
                Some(path) => Output::success(&format!("Report written to {}", path.display())),
                None => println!("{}\n", report.output),
            }
            Output::kv("Run", &report.run_id.to_string());
            Output::kv(
                "Elapsed",
                &format!(
                    "{:.1}s",
                    (report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0
                ),
            );
        }
        Err(e) => {
            Output::error(&format!("Pipeline failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
