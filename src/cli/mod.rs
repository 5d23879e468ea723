//! CLI module for zaai.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// zaai - research, summarize and write
///
/// Searches for videos about a topic, summarizes the best transcript and
/// writes an HTML blog report.
#[derive(Parser, Debug)]
#[command(name = "zaai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the research -> summarize -> write pipeline
    Run {
        /// Topic to research and write about
        #[arg(short, long, default_value = "AI Agents")]
        topic: String,

        /// Write the report here instead of the configured destination
        #[arg(short, long)]
        output: Option<String>,

        /// Crew definitions file (overrides crew.definitions)
        #[arg(long)]
        crew: Option<String>,
    },

    /// Query the search instance directly and print the records
    Search {
        /// Search query
        query: String,

        /// Number of results to request
        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },

    /// Fetch the transcript of a YouTube video
    Transcript {
        /// Video URL containing a v= parameter
        url: String,

        /// Language code (e.g. en, de)
        #[arg(short, long)]
        language: Option<String>,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// List the stages of the configured crew
    Stages {
        /// Crew definitions file (overrides crew.definitions)
        #[arg(long)]
        crew: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the built-in crew definitions as TOML
    Crew,

    /// Show configuration file path
    Path,
}
