//! OpenAI chat-completions generator.

use super::{GenerationRequest, Generator};
use crate::config::LlmSettings;
use crate::error::{Result, ZaaiError};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client with a 5-minute timeout and an optional custom endpoint.
pub fn create_client(api_base: Option<&str>) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()?;

    let config = match api_base {
        Some(base) => OpenAIConfig::default().with_api_base(base),
        None => OpenAIConfig::default(),
    };

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Generator backed by an OpenAI-compatible chat model.
pub struct OpenAIGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIGenerator {
    /// Create a generator from settings.
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings.api_base.as_deref())?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, request), fields(stage = %request.stage))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system.clone())
                .build()
                .map_err(|e| ZaaiError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user.clone())
                .build()
                .map_err(|e| ZaaiError::Generation(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| ZaaiError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| ZaaiError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ZaaiError::Generation("Empty response from model".to_string()))?
            .clone();

        debug!("Generated {} characters", content.len());
        Ok(content)
    }
}
