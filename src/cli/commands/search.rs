//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::{is_error_record, SearchQuery, SearxSearchTool};
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: Option<u32>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;

    let tool = SearxSearchTool::new(&settings.search)?;
    let query = SearchQuery::new(query, limit.unwrap_or(settings.search.result_limit))?;

    let spinner = Output::spinner("Searching...");
    let results = tool.search(&query).await;
    spinner.finish_and_clear();

    if let Some(error) = results.iter().find(|r| is_error_record(r)) {
        let message = error["error"].as_str().unwrap_or("unknown error");
        Output::error(&format!("Search failed: {}", message));
        return Err(anyhow::anyhow!("{}", message));
    }

    if results.is_empty() {
        Output::warning("No results found matching your query.");
        return Ok(());
    }

    Output::success(&format!("Found {} results", results.len()));
    for (i, record) in results.iter().enumerate() {
        Output::search_record(
            i + 1,
            record["title"].as_str().unwrap_or("(untitled)"),
            record["url"].as_str(),
            record["content"].as_str(),
        );
    }
    println!();

    Ok(())
}
