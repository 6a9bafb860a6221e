// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory commands: append, recent, history, search, clear.
//!
//! Each command returns the text to print so it can be checked in tests.

use std::sync::Arc;

use parley_config::ParleyConfig;
use parley_core::{
    AgentId, CallScope, EmbeddingAdapter, ParleyError, Role, ScoredTurn, StorageAdapter, Turn,
};
use parley_memory::MemoryManager;
use parley_openai::OpenAiEmbedder;
use parley_storage::SqliteStorage;

/// An opened store with a memory manager over it.
pub struct App {
    storage: Arc<SqliteStorage>,
    memory: MemoryManager,
}

impl App {
    /// Open the configured ledger and embedding provider.
    pub async fn open(config: &ParleyConfig) -> Result<Self, ParleyError> {
        let storage = Arc::new(
            SqliteStorage::open(config.storage.clone(), config.embedding.dimensions).await?,
        );
        let embedder = Arc::new(OpenAiEmbedder::new(&config.embedding)?);
        Ok(Self::with_parts(storage, embedder, config))
    }

    pub fn with_parts(
        storage: Arc<SqliteStorage>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: &ParleyConfig,
    ) -> Self {
        let memory = MemoryManager::new(storage.clone(), embedder, config.memory.clone());
        Self { storage, memory }
    }

    pub async fn append(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        role: Role,
        content: &str,
    ) -> Result<String, ParleyError> {
        let id = self.memory.append(scope, agent_id, role, content).await?;
        Ok(format!("appended turn {id} for {agent_id}"))
    }

    pub async fn recent(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        limit: Option<i64>,
    ) -> Result<String, ParleyError> {
        let turns = match limit {
            Some(n) => self.memory.recent_context_with(scope, agent_id, n).await?,
            None => self.memory.recent_context(scope, agent_id).await?,
        };
        Ok(format_turns(&turns))
    }

    pub async fn history(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        json: bool,
    ) -> Result<String, ParleyError> {
        let turns = self.memory.full_history(scope, agent_id).await?;
        if json {
            return serde_json::to_string_pretty(&turns)
                .map_err(|e| ParleyError::Internal(format!("failed to serialize history: {e}")));
        }
        Ok(format_turns(&turns))
    }

    pub async fn search(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        query: &str,
        k: Option<i64>,
    ) -> Result<String, ParleyError> {
        let k = k.unwrap_or(self.memory.config().similar_results);
        let scored = self
            .memory
            .similar_context_scored(scope, agent_id, query, k)
            .await?;
        Ok(format_scored(&scored))
    }

    pub async fn clear(&self, scope: &CallScope, agent_id: &AgentId) -> Result<String, ParleyError> {
        let removed = self.memory.clear_history(scope, agent_id).await?;
        let noun = if removed == 1 { "turn" } else { "turns" };
        Ok(format!("removed {removed} {noun} for {agent_id}"))
    }

    pub async fn close(&self) -> Result<(), ParleyError> {
        self.storage.close().await
    }
}

fn format_turns(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "no turns".to_string();
    }
    turns
        .iter()
        .map(|turn| {
            let marker = if turn.has_embedding() { ' ' } else { '*' };
            format!(
                "#{:<5}{marker} {}  {:>9}: {}",
                turn.id.0,
                turn.created_at,
                turn.role.as_str(),
                turn.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_scored(scored: &[ScoredTurn]) -> String {
    if scored.is_empty() {
        return "no similar turns".to_string();
    }
    scored
        .iter()
        .map(|s| {
            format!(
                "{:.4}  #{:<5} {:>9}: {}",
                s.distance,
                s.turn.id.0,
                s.turn.role.as_str(),
                s.turn.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
