// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage and conversation-store traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use parley_config::StorageConfig;
use parley_core::vector;
use parley_core::{
    AdapterType, AgentId, CallScope, ConversationStore, HealthStatus, NewTurn, ParleyError,
    PluginAdapter, ScoredTurn, StorageAdapter, Turn, TurnId,
};

use crate::database::{Database, map_tr_err};
use crate::models::LedgerStats;
use crate::queries;

/// SQLite-backed turn ledger.
///
/// Wraps a [`Database`] handle and delegates to the typed query module. The
/// database is opened on [`StorageAdapter::initialize`]; [`SqliteStorage::open`]
/// does both steps at once.
pub struct SqliteStorage {
    config: StorageConfig,
    dimensions: usize,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a storage adapter for vectors of length `dimensions`.
    ///
    /// The database is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig, dimensions: usize) -> Self {
        Self {
            config,
            dimensions,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize in one step.
    pub async fn open(config: StorageConfig, dimensions: usize) -> Result<Self, ParleyError> {
        let storage = Self::new(config, dimensions);
        storage.initialize().await?;
        Ok(storage)
    }

    /// Ledger-wide counts, for diagnostics.
    pub async fn stats(&self) -> Result<LedgerStats, ParleyError> {
        queries::turns::ledger_stats(self.db()?).await
    }

    fn db(&self) -> Result<&Database, ParleyError> {
        self.db
            .get()
            .ok_or_else(|| ParleyError::store("storage not initialized -- call initialize() first"))
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        let db = self.db()?;
        db.writer()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        db.reader()
            .await?
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ParleyError> {
        let db = Database::open(&self.config, self.dimensions).await?;
        self.db
            .set(db)
            .map_err(|_| ParleyError::store("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ParleyError> {
        self.db()?.close().await
    }
}

#[async_trait]
impl ConversationStore for SqliteStorage {
    async fn insert(&self, scope: &CallScope, turn: NewTurn) -> Result<TurnId, ParleyError> {
        let db = self.db()?;
        let agent_id = turn.agent_id.clone();
        let id = scope.run(queries::turns::insert_turn(db, turn)).await?;
        debug!(agent_id = %agent_id, turn_id = %id, "turn inserted");
        Ok(id)
    }

    async fn query_recent(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        limit: i64,
    ) -> Result<Vec<Turn>, ParleyError> {
        let db = self.db()?;
        scope
            .run(queries::turns::recent_turns(db, agent_id, limit))
            .await
    }

    async fn query_full(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
    ) -> Result<Vec<Turn>, ParleyError> {
        let db = self.db()?;
        scope.run(queries::turns::all_turns(db, agent_id)).await
    }

    async fn query_by_vector(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
        query: &[f32],
        k: i64,
    ) -> Result<Vec<ScoredTurn>, ParleyError> {
        if query.len() != self.dimensions {
            return Err(ParleyError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if k <= 0 {
            return Ok(Vec::new());
        }

        let db = self.db()?;
        let candidates = scope
            .run(queries::turns::embedded_turns(db, agent_id))
            .await?;
        let k = usize::try_from(k).unwrap_or(usize::MAX);
        vector::rank(query, candidates, k)
    }

    async fn clear_history(
        &self,
        scope: &CallScope,
        agent_id: &AgentId,
    ) -> Result<usize, ParleyError> {
        let db = self.db()?;
        let removed = scope
            .run(queries::turns::delete_turns(db, agent_id))
            .await?;
        debug!(agent_id = %agent_id, removed, "history cleared");
        Ok(removed)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
