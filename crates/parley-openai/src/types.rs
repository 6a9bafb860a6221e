// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI embeddings API request/response types.

use serde::{Deserialize, Serialize};

/// Body of `POST /embeddings`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
}

/// Successful embeddings response.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<EmbeddingUsage>,
}

/// One vector, tagged with the position of its input text.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingUsage {
    pub prompt_tokens: u32,
    pub total_tokens: u32,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_input_as_array() {
        let req = EmbeddingRequest {
            model: "text-embedding-ada-002".into(),
            input: vec!["hello".into()],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "text-embedding-ada-002", "input": ["hello"]})
        );
    }

    #[test]
    fn response_tolerates_missing_optional_fields() {
        let body = r#"{"data":[{"embedding":[0.5,-0.25]}]}"#;
        let resp: EmbeddingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.data[0].embedding, vec![0.5, -0.25]);
        assert_eq!(resp.data[0].index, 0);
        assert!(resp.usage.is_none());
    }

    #[test]
    fn error_envelope_parses_null_code() {
        let body = r#"{"error":{"message":"quota","type":"insufficient_quota","code":null}}"#;
        let err: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(err.error.message, "quota");
        assert_eq!(err.error.type_.as_deref(), Some("insufficient_quota"));
        assert!(err.error.code.is_none());
    }
}
