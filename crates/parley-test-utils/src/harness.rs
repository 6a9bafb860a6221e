// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-directory SQLite ledger for integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use parley_config::StorageConfig;
use parley_core::ParleyError;
use parley_storage::SqliteStorage;

/// An opened ledger whose database file lives in a temp directory.
///
/// The directory is removed when the harness drops.
pub struct TempLedger {
    pub storage: Arc<SqliteStorage>,
    pub config: StorageConfig,
    _temp_dir: tempfile::TempDir,
}

impl TempLedger {
    /// Open a ledger with the given vector dimension and a reader pool of 4.
    pub async fn open(dimensions: usize) -> Result<Self, ParleyError> {
        Self::open_with(dimensions, 4).await
    }

    pub async fn open_with(dimensions: usize, read_pool_size: usize) -> Result<Self, ParleyError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| ParleyError::StoreUnavailable {
            source: e.into(),
        })?;
        let config = StorageConfig {
            database_path: temp_dir.path().join("parley.db").to_string_lossy().into_owned(),
            read_pool_size,
            ..StorageConfig::default()
        };
        let storage = SqliteStorage::open(config.clone(), dimensions).await?;
        Ok(Self {
            storage: Arc::new(storage),
            config,
            _temp_dir: temp_dir,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.config.database_path)
    }
}
