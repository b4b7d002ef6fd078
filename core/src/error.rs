use std::borrow::Cow;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::completion::CompletionError;
use crate::config::ConfigError;
use crate::document::DocumentError;
use crate::embeddings::EmbeddingError;

pub type Result<T> = std::result::Result<T, DocQaError>;

/// Structured error codes for logging and categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Configuration errors (F000-F999)
    ConfigurationInvalid,
    ConfigurationUnreadable,

    // Retrieval errors (R000-R999)
    RetrievalEmptyCorpus,
    RetrievalNotFitted,
    RetrievalNotInitialized,
    RetrievalDimensionMismatch,

    // Question errors (Q000-Q999)
    QuestionEmpty,

    // Document errors (D000-D999)
    DocumentUnreadable,

    // Upstream collaborator errors (U000-U999)
    UpstreamEmbedding,
    UpstreamCompletion,
}

impl ErrorCode {
    /// Get the error code as a string for logging and debugging
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigurationInvalid => "F001",
            ErrorCode::ConfigurationUnreadable => "F002",
            ErrorCode::RetrievalEmptyCorpus => "R001",
            ErrorCode::RetrievalNotFitted => "R002",
            ErrorCode::RetrievalNotInitialized => "R003",
            ErrorCode::RetrievalDimensionMismatch => "R004",
            ErrorCode::QuestionEmpty => "Q001",
            ErrorCode::DocumentUnreadable => "D001",
            ErrorCode::UpstreamEmbedding => "U001",
            ErrorCode::UpstreamCompletion => "U002",
        }
    }

    /// Get a category description for this error code
    pub const fn category(&self) -> &'static str {
        match self {
            ErrorCode::ConfigurationInvalid | ErrorCode::ConfigurationUnreadable => {
                "Configuration"
            }
            ErrorCode::RetrievalEmptyCorpus
            | ErrorCode::RetrievalNotFitted
            | ErrorCode::RetrievalNotInitialized
            | ErrorCode::RetrievalDimensionMismatch => "Retrieval",
            ErrorCode::QuestionEmpty => "Question",
            ErrorCode::DocumentUnreadable => "Document",
            ErrorCode::UpstreamEmbedding | ErrorCode::UpstreamCompletion => "Upstream",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.as_str(), self.category())
    }
}

/// Failure reported by one of the opaque collaborators. Wrapped as-is, never retried.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("embedding provider: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("completion backend: {0}")]
    Completion(#[from] CompletionError),
}

#[derive(Error, Debug)]
pub enum DocQaError {
    /// Non-positive word length or batch size, or a neighbor count the index cannot satisfy.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("cannot fit an empty corpus")]
    EmptyCorpus,

    #[error("retriever has not been fitted")]
    NotFitted,

    /// `initialize()` has not completed on the embedding provider.
    #[error("embedding provider has not been initialized")]
    NotInitialized,

    /// Query and stored vectors disagree on length; usually a provider/model mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("question is empty")]
    EmptyQuery,

    #[error("upstream failure: {0}")]
    Upstream(#[source] UpstreamError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<EmbeddingError> for DocQaError {
    fn from(err: EmbeddingError) -> Self {
        DocQaError::Upstream(UpstreamError::Embedding(err))
    }
}

impl From<CompletionError> for DocQaError {
    fn from(err: CompletionError) -> Self {
        DocQaError::Upstream(UpstreamError::Completion(err))
    }
}

impl DocQaError {
    pub fn configuration(message: impl Into<String>) -> Self {
        DocQaError::Configuration(message.into())
    }

    pub const fn error_code(&self) -> ErrorCode {
        match self {
            DocQaError::Configuration(_) => ErrorCode::ConfigurationInvalid,
            DocQaError::Config(ConfigError::Invalid(_)) => ErrorCode::ConfigurationInvalid,
            DocQaError::Config(_) => ErrorCode::ConfigurationUnreadable,
            DocQaError::EmptyCorpus => ErrorCode::RetrievalEmptyCorpus,
            DocQaError::NotFitted => ErrorCode::RetrievalNotFitted,
            DocQaError::NotInitialized => ErrorCode::RetrievalNotInitialized,
            DocQaError::DimensionMismatch { .. } => ErrorCode::RetrievalDimensionMismatch,
            DocQaError::EmptyQuery => ErrorCode::QuestionEmpty,
            DocQaError::Document(_) => ErrorCode::DocumentUnreadable,
            DocQaError::Upstream(UpstreamError::Embedding(_)) => ErrorCode::UpstreamEmbedding,
            DocQaError::Upstream(UpstreamError::Completion(_)) => ErrorCode::UpstreamCompletion,
        }
    }

    /// True when the failure came from a collaborator; callers own any retry policy.
    pub const fn is_upstream(&self) -> bool {
        matches!(self, DocQaError::Upstream(_))
    }

    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> Cow<'static, str> {
        match self {
            DocQaError::EmptyQuery => Cow::Borrowed("Question field is empty"),
            DocQaError::NotFitted | DocQaError::EmptyCorpus => {
                Cow::Borrowed("No document has been loaded yet")
            }
            DocQaError::Upstream(UpstreamError::Completion(CompletionError::MissingApiKey)) => {
                Cow::Borrowed("Please provide an API key for the completion backend")
            }
            other => Cow::Owned(other.to_string()),
        }
    }
}
