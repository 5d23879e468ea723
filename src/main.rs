//! zaai CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zaai::cli::{commands, Cli, Commands};
use zaai::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Populate the environment from .env before anything reads it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging; -v flags take precedence over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("zaai={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::Run {
            topic,
            output,
            crew,
        } => {
            commands::run_pipeline(topic, output.clone(), crew.clone(), settings).await?;
        }

        Commands::Search { query, limit } => {
            commands::run_search(query, *limit, settings).await?;
        }

        Commands::Transcript {
            url,
            language,
            json,
        } => {
            commands::run_transcript(url, language.clone(), *json, settings).await?;
        }

        Commands::Stages { crew } => {
            commands::run_stages(crew.clone(), &settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
