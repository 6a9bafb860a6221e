// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapters for deterministic testing.
//!
//! `MockEmbedder` places texts by keyword: each topic owns one dimension
//! (greetings, weather, food, farewells, programming), and every token
//! also adds a smaller weight to a hashed dimension so texts sharing words
//! sit closer together. Same text, same vector, on every run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use parley_core::{
    AdapterType, EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus, ParleyError,
    PluginAdapter,
};

const TOPICS: &[&[&str]] = &[
    &["hi", "hello", "hey", "greetings", "howdy", "morning"],
    &[
        "weather",
        "rain",
        "raining",
        "sunny",
        "forecast",
        "temperature",
        "snow",
        "cloudy",
        "storm",
    ],
    &["eat", "food", "lunch", "dinner", "pizza", "hungry", "breakfast"],
    &["bye", "goodbye", "farewell", "later", "night"],
    &["code", "rust", "bug", "compile", "program"],
];

const TOPIC_WEIGHT: f32 = 1.0;
const TOKEN_WEIGHT: f32 = 0.5;

/// Deterministic keyword-bucket embedder.
pub struct MockEmbedder {
    dimensions: usize,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockEmbedder {
    /// Embedder producing vectors of length `dimensions` (at least 1).
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `embed` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The vector this embedder assigns to `text`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let d = self.dimensions;
        let mut vector = vec![0.0f32; d];
        let (hash_start, hash_span) = if d > TOPICS.len() {
            (TOPICS.len(), d - TOPICS.len())
        } else {
            (0, d)
        };

        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            for (topic, words) in TOPICS.iter().enumerate() {
                if words.contains(&token) {
                    vector[topic % d] += TOPIC_WEIGHT;
                }
            }
            let slot = hash_start + (fnv1a(token) % hash_span as u64) as usize;
            vector[slot] += TOKEN_WEIGHT;
        }
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(32)
    }
}

fn fnv1a(token: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ParleyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| self.vector_for(t)).collect(),
            dimensions: self.dimensions,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Embedder whose every call fails with `EmbeddingUnavailable`.
pub struct FailingEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for FailingEmbedder {
    fn name(&self) -> &str {
        "failing-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Unhealthy("simulated outage".into()))
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for FailingEmbedder {
    async fn embed(&self, _input: EmbeddingInput) -> Result<EmbeddingOutput, ParleyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ParleyError::embedding("simulated provider outage"))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
