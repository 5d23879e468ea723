//! zaai - a research, summarize and write pipeline
//!
//! Searches a SearXNG instance for videos about a topic, pulls the transcript
//! of the best match from YouTube, and has a language model write an HTML
//! blog report from the results.
//!
//! # Architecture
//!
//! - `config` - Settings, crew definitions and prompt templates
//! - `tools` - Search and transcript adapters behind the `Tool` trait
//! - `llm` - Text generation
//! - `crew` - Sequential stage runner
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//! use zaai::config::{CrewDefinition, Settings};
//! use zaai::crew::Crew;
//! use zaai::llm::OpenAIGenerator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let generator = Arc::new(OpenAIGenerator::new(&settings.llm)?);
//!     let crew = Crew::from_definition(&CrewDefinition::default(), &settings, generator)?;
//!
//!     let mut inputs = BTreeMap::new();
//!     inputs.insert("topic".to_string(), "AI Agents".to_string());
//!
//!     let report = crew.run(&inputs).await?;
//!     println!("Wrote {:?}", report.artifact);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod crew;
pub mod error;
pub mod llm;
pub mod tools;

pub use error::{Result, ZaaiError};
