//! Generative completion capability consumed by [`crate::pipeline::DocumentQa`].

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("API key missing for completion backend")]
    MissingApiKey,

    #[error("API error: {0}")]
    Api(String),

    #[error("completion backend returned no choices")]
    EmptyResponse,
}

/// A single prompt-in, text-out call. No retries happen behind this trait.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
