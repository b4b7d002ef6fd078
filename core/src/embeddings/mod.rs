//! Embedding capability consumed by the retriever.
//!
//! The model itself is opaque: anything that maps a batch of strings to
//! fixed-length vectors, in input order, satisfies [`EmbeddingProvider`].
//! - [`HashedEmbeddings`] is a deterministic, offline provider
//! - HTTP providers live in the `docqa-openai` crate

pub mod hashed;

pub use hashed::HashedEmbeddings;

use async_trait::async_trait;
use thiserror::Error;

pub type EmbeddingVector = Vec<f32>;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// `load()` has not completed yet.
    #[error("embedding model not loaded")]
    NotLoaded,

    #[error("API error: {0}")]
    Api(String),

    #[error("API key missing for embedding provider")]
    MissingApiKey,

    /// The provider returned a different number of vectors than inputs.
    #[error("batch length mismatch: sent {expected} texts, got {actual} vectors")]
    BatchLength { expected: usize, actual: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the unique model identifier
    fn model_id(&self) -> String;

    /// Get the dimensions of every vector this provider returns
    fn dimensions(&self) -> usize;

    /// One-time model initialization. Must complete before the first `embed_batch`.
    async fn load(&self) -> Result<(), EmbeddingError> {
        Ok(())
    }

    /// Embed multiple texts; output has the same length and order as `texts`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError>;
}
