// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible embedding adapter for the Parley memory store.
//!
//! This crate implements [`EmbeddingAdapter`] over the `/embeddings`
//! endpoint of the OpenAI API (or any server speaking the same protocol).

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use parley_config::EmbeddingConfig;
use parley_core::{
    AdapterType, EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus, ParleyError,
    PluginAdapter,
};
use tracing::{debug, info, warn};

use crate::client::OpenAiClient;

/// Environment variable consulted when the config has no API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Embedding adapter backed by an OpenAI-compatible HTTP API.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var. Without a
/// key the adapter still constructs, but every `embed` call fails with
/// [`ParleyError::EmbeddingUnavailable`] so callers degrade instead of
/// refusing to start.
pub struct OpenAiEmbedder {
    client: Option<OpenAiClient>,
    dimensions: usize,
}

impl OpenAiEmbedder {
    /// Creates an embedder from the `[embedding]` config section.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, ParleyError> {
        let client = match resolve_api_key(&config.api_key) {
            Some(api_key) => {
                let client = OpenAiClient::new(
                    &api_key,
                    &config.api_base,
                    config.model.clone(),
                    Duration::from_secs(config.timeout_secs),
                    config.max_retries,
                )?;
                info!(
                    model = %config.model,
                    dimensions = config.dimensions,
                    "OpenAI embedder initialized"
                );
                Some(client)
            }
            None => {
                warn!("no embedding API key configured; embeddings are disabled");
                None
            }
        };

        Ok(Self {
            client,
            dimensions: config.dimensions,
        })
    }

    /// Creates an embedder around an existing client.
    pub fn with_client(client: OpenAiClient, dimensions: usize) -> Self {
        Self {
            client: Some(client),
            dimensions,
        }
    }

    fn client(&self) -> Result<&OpenAiClient, ParleyError> {
        self.client.as_ref().ok_or_else(|| {
            ParleyError::embedding(format!(
                "no API key: set embedding.api_key or {API_KEY_ENV}"
            ))
        })
    }
}

/// Config value first, then the environment. Blank values count as unset.
fn resolve_api_key(configured: &Option<String>) -> Option<String> {
    let usable = |key: &String| !key.trim().is_empty();
    configured
        .clone()
        .filter(usable)
        .or_else(|| std::env::var(API_KEY_ENV).ok().filter(usable))
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embeddings"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(match &self.client {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("no API key configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ParleyError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: self.dimensions,
            });
        }

        let client = self.client()?;
        let expected = input.texts.len();
        let mut response = client.create_embeddings(input.texts).await?;

        if response.data.len() != expected {
            return Err(ParleyError::embedding(format!(
                "expected {expected} embeddings, got {}",
                response.data.len()
            )));
        }

        response.data.sort_by_key(|d| d.index);
        let mut embeddings = Vec::with_capacity(expected);
        for data in response.data {
            if data.embedding.len() != self.dimensions {
                return Err(ParleyError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: data.embedding.len(),
                });
            }
            embeddings.push(data.embedding);
        }

        debug!(count = embeddings.len(), model = client.model(), "embeddings generated");
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
