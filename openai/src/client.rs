//! Shared JSON-over-HTTPS plumbing for the OpenAI endpoints.

use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// Authenticated client bound to one endpoint URL.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl ApiClient {
    pub(crate) fn new(endpoint: String, api_key: String) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            api_key,
        }
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `request` and decode the success body. Failures come back as a
    /// human-readable message for the caller's `Api` error variant.
    pub(crate) async fn post<Req, Resp>(&self, request: &Req) -> Result<Resp, String>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| format!("Request failed: {e}"))?;

        let status = response.status();
        debug!(endpoint = %self.endpoint, %status, "openai response");
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(describe_failure(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse response: {e}"))
    }
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            error:
                ApiErrorDetail {
                    message,
                    error_type: Some(error_type),
                },
        }) => format!("OpenAI API error ({status}): {error_type} - {message}"),
        Ok(ApiErrorBody { error }) => format!("OpenAI API error ({status}): {}", error.message),
        Err(_) => format!("OpenAI API error ({status}): {body}"),
    }
}
