// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Parley memory store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ParleyError;

/// Opaque identifier of the agent a conversation belongs to.
///
/// The memory store partitions every turn by this key and never
/// requires the agent to exist anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Store-assigned, monotonically increasing turn identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(pub i64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Speaker of a turn. Closed set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Column value used by the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a role, rejecting anything outside the closed set.
    pub fn parse(value: &str) -> Result<Self, ParleyError> {
        Role::from_str(value).map_err(|_| {
            ParleyError::ConstraintViolation(format!(
                "role `{value}` is not one of: user, assistant"
            ))
        })
    }
}

/// One recorded message in an agent's conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: TurnId,
    pub agent_id: AgentId,
    pub role: Role,
    pub content: String,
    /// Present only if embedding generation succeeded when the turn was appended.
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    /// ISO 8601 UTC timestamp with millisecond precision, assigned by the store.
    pub created_at: String,
}

impl Turn {
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

/// A turn about to be written. The store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTurn {
    pub agent_id: AgentId,
    pub role: Role,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
}

impl NewTurn {
    pub fn new(agent_id: AgentId, role: Role, content: impl Into<String>) -> Self {
        Self {
            agent_id,
            role,
            content: content.into(),
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Option<Vec<f32>>) -> Self {
        self.embedding = embedding;
        self
    }

    /// Check content and vector shape against the store's dimension.
    pub fn validate(&self, dimensions: usize) -> Result<(), ParleyError> {
        if self.content.trim().is_empty() {
            return Err(ParleyError::ConstraintViolation(
                "turn content must not be empty".to_string(),
            ));
        }
        if let Some(embedding) = &self.embedding
            && embedding.len() != dimensions
        {
            return Err(ParleyError::DimensionMismatch {
                expected: dimensions,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
}

/// A turn returned by similarity search, with its cosine distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTurn {
    pub turn: Turn,
    /// 1 - cosine similarity. Lower is more relevant.
    pub distance: f32,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Embedding,
    Provider,
    AgentDirectory,
}

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

impl EmbeddingInput {
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            texts: vec![text.into()],
        }
    }
}

/// Output from an embedding adapter. One vector per input text, in order.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}
