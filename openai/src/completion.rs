//! `POST /v1/completions`

use async_trait::async_trait;
use docqa_core::CompletionBackend;
use docqa_core::CompletionError;
use docqa_core::config::CompletionConfig;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::client::ApiClient;

pub const DEFAULT_COMPLETIONS_ENDPOINT: &str = "https://api.openai.com/v1/completions";

/// One completion per prompt, no stop sequence, no retries.
pub struct OpenAiCompletion {
    client: ApiClient,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiCompletion {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
        api_endpoint: Option<String>,
    ) -> Result<Self, CompletionError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CompletionError::MissingApiKey);
        }
        let endpoint =
            api_endpoint.unwrap_or_else(|| DEFAULT_COMPLETIONS_ENDPOINT.to_string());

        Ok(Self {
            client: ApiClient::new(endpoint, api_key),
            model: model.into(),
            max_tokens,
            temperature,
        })
    }

    pub fn from_config(
        config: &CompletionConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        Self::new(
            api_key,
            config.model.clone(),
            config.max_tokens,
            config.temperature,
            config.api_endpoint.clone(),
        )
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    n: u32,
    stop: Option<&'a [&'a str]>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

#[async_trait]
impl CompletionBackend for OpenAiCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            n: 1,
            stop: None,
        };
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting completion");

        let response: CompletionResponse = self
            .client
            .post(&request)
            .await
            .map_err(CompletionError::Api)?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or(CompletionError::EmptyResponse)
    }
}
