// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory manager: append with best-effort embedding, recency window,
//! and semantic retrieval over a conversation store.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use parley_config::MemoryConfig;
use parley_core::{
    AgentDirectory, AgentId, CallScope, ConversationStore, EmbeddingAdapter, EmbeddingInput,
    NewTurn, ParleyError, Role, ScoredTurn, Turn, TurnId,
};

use crate::context::ConversationContext;
use crate::recording;

/// Outcome of a semantic lookup, including whether embedding was skipped.
pub(crate) struct SimilarLookup {
    pub turns: Vec<ScoredTurn>,
    pub degraded: bool,
    /// The query's own vector, when one was computed.
    pub query_vector: Option<Vec<f32>>,
}

/// Orchestrates a conversation store and an embedding provider.
///
/// Construct one per process and share it by `Arc`; every operation is safe
/// to call concurrently for the same or different agents.
pub struct MemoryManager {
    store: Arc<dyn ConversationStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
    agents: Option<Arc<dyn AgentDirectory>>,
    config: MemoryConfig,
}

impl MemoryManager {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: MemoryConfig,
    ) -> Self {
        if embedder.dimensions() != store.dimensions() {
            warn!(
                store = store.dimensions(),
                embedder = embedder.dimensions(),
                "embedding provider and store disagree on vector dimension"
            );
        }
        Self {
            store,
            embedder,
            agents: None,
            config,
        }
    }

    /// Reject appends for agents the directory does not know.
    pub fn with_agent_directory(mut self, agents: Arc<dyn AgentDirectory>) -> Self {
        self.agents = Some(agents);
        self
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Record a turn, embedding its content when the provider cooperates.
    ///
    /// Embedding failures and timeouts are logged and the turn is stored
    /// without a vector. Store errors, dimension drift, and interruption of
    /// the caller's scope are returned unchanged.
    pub async fn append(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        role: Role,
        content: &str,
    ) -> Result<TurnId, ParleyError> {
        self.append_with(scope, agent_id, role, content, None).await
    }

    /// Append, reusing `embedding` when the content was already embedded.
    pub(crate) async fn append_with(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        role: Role,
        content: &str,
        embedding: Option<Vec<f32>>,
    ) -> Result<TurnId, ParleyError> {
        scope.check()?;

        let turn = NewTurn::new(agent_id.clone(), role, content);
        turn.validate(self.store.dimensions())?;

        if let Some(agents) = &self.agents
            && !scope.run(agents.agent_exists(agent_id)).await?
        {
            return Err(ParleyError::ConstraintViolation(format!(
                "unknown agent `{agent_id}`"
            )));
        }

        let embedding = match embedding {
            Some(vector) => Some(vector),
            None => self.embed_best_effort(scope, content, "append").await?,
        };
        let embedded = embedding.is_some();
        let turn_id = self
            .store
            .insert(scope, turn.with_embedding(embedding))
            .await?;

        recording::record_append(role, embedded);
        debug!(agent_id = %agent_id, turn_id = %turn_id, %role, embedded, "turn appended");
        Ok(turn_id)
    }

    /// The configured recency window, oldest first.
    pub async fn recent_context(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
    ) -> Result<Vec<Turn>, ParleyError> {
        self.recent_context_with(scope, agent_id, self.config.context_size)
            .await
    }

    /// At most `window` most recent turns, oldest first.
    pub async fn recent_context_with(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        window: i64,
    ) -> Result<Vec<Turn>, ParleyError> {
        self.store.query_recent(scope, agent_id, window).await
    }

    /// Turns most similar to `query`, using the configured result count.
    pub async fn similar_context(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        query: &str,
    ) -> Result<Vec<Turn>, ParleyError> {
        self.similar_context_with(scope, agent_id, query, self.config.similar_results)
            .await
    }

    /// Up to `k` turns most similar to `query`, most relevant first.
    ///
    /// Returns an empty list when the query cannot be embedded.
    pub async fn similar_context_with(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        query: &str,
        k: i64,
    ) -> Result<Vec<Turn>, ParleyError> {
        let scored = self.similar_context_scored(scope, agent_id, query, k).await?;
        Ok(scored.into_iter().map(|s| s.turn).collect())
    }

    /// Like [`similar_context_with`](Self::similar_context_with) but keeps
    /// each turn's cosine distance.
    pub async fn similar_context_scored(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        query: &str,
        k: i64,
    ) -> Result<Vec<ScoredTurn>, ParleyError> {
        Ok(self.lookup_similar(scope, agent_id, query, k).await?.turns)
    }

    /// Every turn of the agent, oldest first.
    pub async fn full_history(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
    ) -> Result<Vec<Turn>, ParleyError> {
        self.store.query_full(scope, agent_id).await
    }

    /// Delete the agent's history. Clearing an empty history returns 0.
    pub async fn clear_history(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
    ) -> Result<usize, ParleyError> {
        let removed = self.store.clear_history(scope, agent_id).await?;
        debug!(agent_id = %agent_id, removed, "history cleared");
        Ok(removed)
    }

    /// Recency window and semantic matches for `query`, fetched concurrently.
    pub async fn conversation_context(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        query: &str,
    ) -> Result<ConversationContext, ParleyError> {
        Ok(self.gather_context(scope, agent_id, query).await?.0)
    }

    /// Build the context for `query` and hand back the query's vector.
    ///
    /// Semantic candidates are over-fetched by the window size so turns
    /// already in the window do not use up the `similar_results` slots.
    pub(crate) async fn gather_context(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        query: &str,
    ) -> Result<(ConversationContext, Option<Vec<f32>>), ParleyError> {
        let k = self.config.similar_results;
        let fetch = if k > 0 {
            k.saturating_add(self.config.context_size.max(0))
        } else {
            k
        };
        let (recent, similar) = futures::future::try_join(
            self.recent_context(scope, agent_id),
            self.lookup_similar(scope, agent_id, query, fetch),
        )
        .await?;

        let mut context = ConversationContext::assemble(
            recent,
            similar.turns.into_iter().map(|s| s.turn).collect(),
            similar.degraded,
        );
        context
            .similar
            .truncate(usize::try_from(k).unwrap_or(0));
        Ok((context, similar.query_vector))
    }

    pub(crate) async fn lookup_similar(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        query: &str,
        k: i64,
    ) -> Result<SimilarLookup, ParleyError> {
        scope.check()?;
        if k <= 0 || query.trim().is_empty() {
            return Ok(SimilarLookup {
                turns: Vec::new(),
                degraded: false,
                query_vector: None,
            });
        }

        let Some(vector) = self.embed_best_effort(scope, query, "similar").await? else {
            recording::record_similar_query(true);
            return Ok(SimilarLookup {
                turns: Vec::new(),
                degraded: true,
                query_vector: None,
            });
        };

        let turns = self
            .store
            .query_by_vector(scope, agent_id, &vector, k)
            .await?;
        recording::record_similar_query(false);
        debug!(agent_id = %agent_id, k, found = turns.len(), "similar turns retrieved");
        Ok(SimilarLookup {
            turns,
            degraded: false,
            query_vector: Some(vector),
        })
    }

    /// Embed one text under the embedding budget.
    ///
    /// `Ok(None)` means the provider failed or ran out of time and the
    /// caller should carry on without a vector.
    async fn embed_best_effort(
        &self,
        scope: &CallScope,
        text: &str,
        op: &'static str,
    ) -> Result<Option<Vec<f32>>, ParleyError> {
        let budget = Duration::from_millis(self.config.embedding_timeout_ms);
        let embed_scope = scope.child_with_timeout(budget);

        let outcome = embed_scope
            .run(self.embedder.embed(EmbeddingInput::single(text)))
            .await;

        let err = match outcome {
            Ok(output) => match output.embeddings.into_iter().next() {
                Some(vector) if vector.len() == self.store.dimensions() => {
                    return Ok(Some(vector));
                }
                Some(vector) => {
                    return Err(ParleyError::DimensionMismatch {
                        expected: self.store.dimensions(),
                        actual: vector.len(),
                    });
                }
                None => ParleyError::embedding("provider returned no vectors"),
            },
            Err(e) => e,
        };

        // The caller's own scope ending is not an embedding failure.
        scope.check()?;

        if err.is_recoverable() || err.is_interruption() {
            warn!(op, error = %err, "embedding unavailable, continuing without a vector");
            recording::record_embedding_degraded(op);
            return Ok(None);
        }
        Err(err)
    }
}
