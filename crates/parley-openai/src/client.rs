// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an OpenAI-compatible embeddings endpoint.
//!
//! Provides [`OpenAiClient`] which handles request construction,
//! bearer authentication, and transient error retry.

use std::time::Duration;

use parley_core::ParleyError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, EmbeddingRequest, EmbeddingResponse};

/// HTTP client for embeddings requests.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    model: String,
    max_retries: u32,
    retry_backoff: Duration,
    endpoint: String,
}

impl OpenAiClient {
    /// Creates a new embeddings client.
    ///
    /// `api_base` is the API root (e.g. `https://api.openai.com/v1`); requests
    /// go to `<api_base>/embeddings`.
    pub fn new(
        api_key: &str,
        api_base: &str,
        model: String,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, ParleyError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| ParleyError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ParleyError::EmbeddingUnavailable {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            model,
            max_retries,
            retry_backoff: Duration::from_secs(1),
            endpoint: format!("{}/embeddings", api_base.trim_end_matches('/')),
        })
    }

    /// Returns the embedding model name sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Shortens the pause between retries (for testing with wiremock).
    #[cfg(test)]
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Embeds `input` in one request.
    ///
    /// On transient errors (429, 500, 503), retries up to `max_retries` times.
    pub async fn create_embeddings(
        &self,
        input: Vec<String>,
    ) -> Result<EmbeddingResponse, ParleyError> {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input,
        };

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying embeddings request after transient error");
                tokio::time::sleep(self.retry_backoff).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .json(&request)
                .send()
                .await
                .map_err(|e| ParleyError::EmbeddingUnavailable {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "embeddings response received");

            if status.is_success() {
                let body = response
                    .text()
                    .await
                    .map_err(|e| ParleyError::EmbeddingUnavailable {
                        message: format!("failed to read response body: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return serde_json::from_str(&body).map_err(|e| {
                    ParleyError::EmbeddingUnavailable {
                        message: format!("failed to parse embeddings response: {e}"),
                        source: Some(Box::new(e)),
                    }
                });
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(ParleyError::embedding(format!("API returned {status}: {body}")));
                continue;
            }

            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "embeddings API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(ParleyError::embedding(message));
        }

        Err(last_error
            .unwrap_or_else(|| ParleyError::embedding("embeddings request failed after retries")))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str, max_retries: u32) -> OpenAiClient {
        OpenAiClient::new(
            "sk-test",
            base_url,
            "text-embedding-ada-002".into(),
            Duration::from_secs(5),
            max_retries,
        )
        .unwrap()
        .with_retry_backoff(Duration::from_millis(10))
    }

    fn success_body() -> serde_json::Value {
        serde_json::json!({
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]}],
            "model": "text-embedding-ada-002",
            "usage": {"prompt_tokens": 2, "total_tokens": 2}
        })
    }

    #[tokio::test]
    async fn sends_model_input_and_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_json(serde_json::json!({
                "model": "text-embedding-ada-002",
                "input": ["hello"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&format!("{}/v1/", server.uri()), 1);
        let resp = client.create_embeddings(vec!["hello".into()]).await.unwrap();
        assert_eq!(resp.data[0].embedding, vec![0.1, 0.2, 0.3]);
        assert_eq!(resp.usage.map(|u| u.total_tokens), Some(2));
    }

    #[tokio::test]
    async fn retries_once_on_429() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "slow down", "type": "rate_limit_exceeded"}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 1);
        let resp = client.create_embeddings(vec!["hi".into()]).await.unwrap();
        assert_eq!(resp.data.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_are_embedding_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 1);
        let err = client.create_embeddings(vec!["hi".into()]).await.unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("503"), "got: {err}");
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "bad key", "type": "invalid_request_error", "code": "invalid_api_key"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 3);
        let err = client.create_embeddings(vec!["hi".into()]).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid_request_error") && msg.contains("bad key"), "got: {msg}");
    }

    #[tokio::test]
    async fn malformed_body_is_embedding_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 0);
        let err = client.create_embeddings(vec!["hi".into()]).await.unwrap_err();
        assert!(matches!(err, ParleyError::EmbeddingUnavailable { .. }));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_embedding_unavailable() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = test_client("http://127.0.0.1:9", 0);
        let err = client.create_embeddings(vec!["hi".into()]).await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
