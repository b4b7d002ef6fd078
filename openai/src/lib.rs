//! OpenAI-compatible adapters for the `docqa-core` capability traits.
//!
//! Keys are passed in explicitly; see [`docqa_core::api_key_from_env`].

mod client;
pub mod completion;
pub mod embeddings;

use std::sync::Arc;

use docqa_core::EmbeddingError;
use docqa_core::EmbeddingProvider;
use docqa_core::HashedEmbeddings;
use docqa_core::config::EmbeddingsBackend;
use docqa_core::config::EmbeddingsConfig;

pub use completion::OpenAiCompletion;
pub use embeddings::OpenAiEmbeddings;

/// Build the embedding provider selected by `config`.
///
/// `api_key` is only consulted for remote providers.
pub fn create_embeddings_provider(
    config: &EmbeddingsConfig,
    api_key: Option<String>,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    match config.provider {
        EmbeddingsBackend::Hashed => Ok(Arc::new(HashedEmbeddings::new(
            config.hashed_dimensions(),
        ))),
        EmbeddingsBackend::OpenAI => {
            let api_key = api_key.ok_or(EmbeddingError::MissingApiKey)?;
            Ok(Arc::new(OpenAiEmbeddings::from_config(config, api_key)?))
        }
    }
}
