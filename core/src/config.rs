//! Configuration for chunking, retrieval, embeddings and completion.
//!
//! Credentials are not part of the config. API keys are passed to the provider and
//! backend constructors by the caller (see [`api_key_from_env`]).

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::embeddings::hashed::DEFAULT_HASHED_DIMENSIONS;

/// Environment variables consulted for the OpenAI API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["DOCQA_OPENAI_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DocQaConfig {
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub embeddings: EmbeddingsConfig,
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Words per chunk
    pub word_length: usize,

    /// Citation number of the first page handed to the chunker
    pub start_page: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            word_length: 150,
            start_page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks per embedding request
    pub batch_size: usize,

    /// Chunks retrieved per question (clamped to the corpus size)
    pub neighbor_count: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            neighbor_count: 5,
        }
    }
}

/// Embedding provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingsBackend {
    /// Offline feature-hashing embeddings
    Hashed,
    /// OpenAI-compatible `/embeddings` endpoint
    OpenAI,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    pub provider: EmbeddingsBackend,

    /// Model to use (e.g., "text-embedding-3-small"); ignored by the hashed provider
    pub model: String,

    /// Optional dimension override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,

    /// API endpoint (for custom/proxy endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingsBackend::Hashed,
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
            api_endpoint: None,
        }
    }
}

impl EmbeddingsConfig {
    /// Dimensions the hashed provider should produce.
    pub fn hashed_dimensions(&self) -> usize {
        self.dimensions.unwrap_or(DEFAULT_HASHED_DIMENSIONS)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "text-davinci-002".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            api_endpoint: None,
        }
    }
}

impl DocQaConfig {
    /// Parse and validate a TOML document. Missing sections fall back to defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded config");
        Self::from_toml_str(&contents)
    }

    /// `~/.docqa/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".docqa").join("config.toml"))
    }

    /// Load from [`DocQaConfig::default_path`], or defaults when no file exists.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.chunking.word_length == 0 {
            return invalid("chunking.word_length must be positive");
        }
        if self.chunking.start_page == 0 {
            return invalid("chunking.start_page must be at least 1");
        }
        if self.retrieval.batch_size == 0 {
            return invalid("retrieval.batch_size must be positive");
        }
        if self.retrieval.neighbor_count == 0 {
            return invalid("retrieval.neighbor_count must be at least 1");
        }
        if self.embeddings.dimensions == Some(0) {
            return invalid("embeddings.dimensions must be positive");
        }
        if self.completion.max_tokens == 0 {
            return invalid("completion.max_tokens must be positive");
        }
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return invalid("completion.temperature must be within [0, 2]");
        }
        Ok(())
    }
}

/// First non-blank API key found in [`API_KEY_ENV_VARS`].
pub fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS.iter().find_map(|var| {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_values() {
        let config = DocQaConfig::default();
        assert_eq!(config.chunking.word_length, 150);
        assert_eq!(config.chunking.start_page, 1);
        assert_eq!(config.retrieval.batch_size, 1000);
        assert_eq!(config.retrieval.neighbor_count, 5);
        assert_eq!(config.embeddings.provider, EmbeddingsBackend::Hashed);
        assert_eq!(config.completion.model, "text-davinci-002");
        assert_eq!(config.completion.max_tokens, 512);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_is_all_defaults() {
        assert_eq!(DocQaConfig::from_toml_str("").unwrap(), DocQaConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = DocQaConfig::from_toml_str(
            r#"
[chunking]
word_length = 80

[embeddings]
provider = "openai"
dimensions = 256

[completion]
temperature = 0.2
"#,
        )
        .unwrap();

        assert_eq!(config.chunking.word_length, 80);
        assert_eq!(config.chunking.start_page, 1);
        assert_eq!(config.embeddings.provider, EmbeddingsBackend::OpenAI);
        assert_eq!(config.embeddings.dimensions, Some(256));
        assert_eq!(config.embeddings.model, "text-embedding-3-small");
        assert_eq!(config.completion.temperature, 0.2);
        assert_eq!(config.retrieval, RetrievalConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        for doc in [
            "[chunking]\nword_length = 0",
            "[chunking]\nstart_page = 0",
            "[retrieval]\nbatch_size = 0",
            "[retrieval]\nneighbor_count = 0",
            "[embeddings]\ndimensions = 0",
            "[completion]\nmax_tokens = 0",
            "[completion]\ntemperature = 3.5",
        ] {
            let err = DocQaConfig::from_toml_str(doc).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{doc}");
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = DocQaConfig::from_toml_str("[chunking\nword_length = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[retrieval]\nneighbor_count = 3\n").unwrap();

        let config = DocQaConfig::load(&path).unwrap();
        assert_eq!(config.retrieval.neighbor_count, 3);
    }

    #[test]
    fn hashed_dimensions_fall_back_to_default() {
        let mut embeddings = EmbeddingsConfig::default();
        assert_eq!(embeddings.hashed_dimensions(), DEFAULT_HASHED_DIMENSIONS);
        embeddings.dimensions = Some(64);
        assert_eq!(embeddings.hashed_dimensions(), 64);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = DocQaConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(DocQaConfig::from_toml_str(&text).unwrap(), config);
    }
}
