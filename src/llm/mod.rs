//! Text generation for pipeline stages.

mod openai;

pub use openai::{create_client, OpenAIGenerator};

use crate::error::Result;
use async_trait::async_trait;

/// A rendered prompt for one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Name of the stage the request belongs to.
    pub stage: String,
    pub system: String,
    pub user: String,
}

/// Trait for text generation.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce the stage output for a rendered prompt.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
