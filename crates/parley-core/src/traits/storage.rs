// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits: backend lifecycle and the conversation ledger.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::scope::CallScope;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AgentId, NewTurn, ScoredTurn, Turn, TurnId};

/// Adapter for storage and persistence backends.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connections).
    async fn initialize(&self) -> Result<(), ParleyError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ParleyError>;
}

/// Durable, queryable ledger of turns, partitioned by agent.
///
/// Turns are immutable once written. Every read returns turns of exactly
/// one agent. All operations honour the caller's [`CallScope`].
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persists a turn and returns its store-assigned id.
    ///
    /// The write is durable before this returns. An absent embedding is
    /// recorded as "no vector", never as a zero vector.
    async fn insert(&self, scope: &CallScope, turn: NewTurn) -> Result<TurnId, ParleyError>;

    /// At most `limit` most recent turns, oldest first. `limit <= 0` is empty.
    async fn query_recent(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        limit: i64,
    ) -> Result<Vec<Turn>, ParleyError>;

    /// Every turn of the agent, oldest first.
    async fn query_full(&self, scope: &CallScope, agent_id: &AgentId)
        -> Result<Vec<Turn>, ParleyError>;

    /// Up to `k` embedded turns by ascending cosine distance, newest first on ties.
    ///
    /// Fails with [`ParleyError::DimensionMismatch`] before reading anything
    /// if `query` does not have the store's dimension.
    async fn query_by_vector(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        query: &[f32],
        k: i64,
    ) -> Result<Vec<ScoredTurn>, ParleyError>;

    /// Removes every turn of the agent atomically. Returns how many were removed.
    async fn clear_history(&self, scope: &CallScope, agent_id: &AgentId)
        -> Result<usize, ParleyError>;

    /// The fixed embedding dimension D of this store.
    fn dimensions(&self) -> usize;
}
