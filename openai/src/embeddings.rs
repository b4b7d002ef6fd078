//! `POST /v1/embeddings`
//!
//! Supports:
//! - text-embedding-3-small (256-1536 dimensions)
//! - text-embedding-3-large (256-3072 dimensions)
//! - text-embedding-ada-002 (1536 dimensions)
//! - Batches larger than the API's 2048-input limit, split transparently

use async_trait::async_trait;
use docqa_core::EmbeddingError;
use docqa_core::EmbeddingProvider;
use docqa_core::EmbeddingVector;
use docqa_core::config::EmbeddingsConfig;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::client::ApiClient;

pub const DEFAULT_EMBEDDINGS_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";

/// Inputs accepted per request by the embeddings API.
const MAX_INPUTS_PER_REQUEST: usize = 2048;

pub struct OpenAiEmbeddings {
    client: ApiClient,
    model: String,
    dimensions: Option<usize>,
}

impl OpenAiEmbeddings {
    /// `dimensions` is forwarded to the API and overrides the model default.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: Option<usize>,
        api_endpoint: Option<String>,
    ) -> Result<Self, EmbeddingError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(EmbeddingError::MissingApiKey);
        }
        let endpoint = api_endpoint.unwrap_or_else(|| DEFAULT_EMBEDDINGS_ENDPOINT.to_string());

        Ok(Self {
            client: ApiClient::new(endpoint, api_key),
            model: model.into(),
            dimensions,
        })
    }

    pub fn from_config(
        config: &EmbeddingsConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, EmbeddingError> {
        Self::new(
            api_key,
            config.model.clone(),
            config.dimensions,
            config.api_endpoint.clone(),
        )
    }

    async fn embed_request(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        let request = EmbeddingsRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dimensions,
            encoding_format: "float",
        };
        debug!(
            endpoint = self.client.endpoint(),
            inputs = texts.len(),
            "requesting embeddings"
        );

        let response: EmbeddingsResponse = self
            .client
            .post(&request)
            .await
            .map_err(EmbeddingError::Api)?;

        // The API does not promise input order.
        let mut data = response.data;
        data.sort_by_key(|item| item.index);

        let expected = self.dimensions();
        if let Some(bad) = data.iter().find(|item| item.embedding.len() != expected) {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: bad.embedding.len(),
            });
        }

        Ok(data.into_iter().map(|item| item.embedding).collect())
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    fn model_id(&self) -> String {
        format!("openai:{}", self.model)
    }

    fn dimensions(&self) -> usize {
        self.dimensions.unwrap_or(match self.model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for request in texts.chunks(MAX_INPUTS_PER_REQUEST) {
            vectors.extend(self.embed_request(request).await?);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;
    use wiremock::matchers::body_partial_json;
    use wiremock::matchers::header;
    use wiremock::matchers::method;
    use wiremock::matchers::path;

    fn provider(server: &MockServer, dimensions: Option<usize>) -> OpenAiEmbeddings {
        OpenAiEmbeddings::new(
            "sk-test",
            "text-embedding-3-small",
            dimensions,
            Some(format!("{}/v1/embeddings", server.uri())),
        )
        .unwrap()
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = OpenAiEmbeddings::new("", "text-embedding-3-small", None, None)
            .err()
            .unwrap();
        assert!(matches!(err, EmbeddingError::MissingApiKey));
    }

    #[test]
    fn dimensions_follow_override_then_model() {
        let small = OpenAiEmbeddings::new("k", "text-embedding-3-small", Some(256), None).unwrap();
        assert_eq!(small.dimensions(), 256);

        let large = OpenAiEmbeddings::new("k", "text-embedding-3-large", None, None).unwrap();
        assert_eq!(large.dimensions(), 3072);
        assert_eq!(large.model_id(), "openai:text-embedding-3-large");
    }

    #[tokio::test]
    async fn vectors_are_returned_in_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "text-embedding-3-small",
                "input": ["first", "second"],
                "dimensions": 2,
                "encoding_format": "float",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [
                    {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                    {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]},
                ],
                "model": "text-embedding-3-small",
                "usage": {"prompt_tokens": 2, "total_tokens": 2},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vectors = provider(&server, Some(2))
            .embed_batch(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn wrong_width_vectors_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"index": 0, "embedding": [1.0, 0.0, 0.0]}],
            })))
            .mount(&server)
            .await;

        let err = provider(&server, Some(2))
            .embed_batch(&["only".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn api_errors_carry_the_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Rate limit reached", "type": "requests", "code": null},
            })))
            .mount(&server)
            .await;

        let err = provider(&server, Some(2))
            .embed_batch(&["text".to_string()])
            .await
            .unwrap_err();
        match err {
            EmbeddingError::Api(message) => {
                assert!(message.contains("429"), "{message}");
                assert!(message.contains("Rate limit reached"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_batch_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let vectors = provider(&server, None).embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
