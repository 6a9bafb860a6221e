// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through one tokio-rusqlite connection and its
//! background thread. Reads go through a bounded pool of read-only
//! connections, see [`crate::pool`].

use std::path::Path;
use std::time::Duration;

use rusqlite::{ErrorCode, OpenFlags, OptionalExtension, params};
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use parley_config::StorageConfig;
use parley_core::ParleyError;

use crate::pool::{ReaderGuard, ReaderPool};

const DIMENSIONS_KEY: &str = "embedding_dimensions";

/// Classify a rusqlite error: constraint failures are the caller's fault,
/// everything else means the store could not do its job.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> ParleyError {
    if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        ParleyError::ConstraintViolation(e.to_string())
    } else {
        ParleyError::StoreUnavailable {
            source: Box::new(e),
        }
    }
}

/// Convert a tokio-rusqlite error into a [`ParleyError`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ParleyError {
    match e {
        tokio_rusqlite::Error::Error(inner) => map_sqlite_err(inner),
        other => ParleyError::StoreUnavailable {
            source: Box::new(other),
        },
    }
}

/// An open turn ledger: one writer, a pool of readers, and the pinned dimension.
pub struct Database {
    writer: Connection,
    readers: ReaderPool,
    dimensions: usize,
}

impl Database {
    /// Open (creating if needed) the database at `config.database_path`.
    ///
    /// Runs migrations and pins the embedding dimension on first open.
    /// A database pinned to a different dimension fails with
    /// [`ParleyError::DimensionMismatch`].
    pub async fn open(config: &StorageConfig, dimensions: usize) -> Result<Self, ParleyError> {
        let path = config.database_path.clone();
        if let Some(parent) = Path::new(&path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ParleyError::StoreUnavailable {
                    source: Box::new(e),
                })?;
        }

        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let wal_mode = config.wal_mode;
        let prepare_path = path.clone();
        let pinned = tokio::task::spawn_blocking(move || {
            prepare(&prepare_path, wal_mode, busy_timeout, dimensions)
        })
        .await
        .map_err(|e| ParleyError::Internal(format!("database setup task failed: {e}")))??;

        if pinned != dimensions {
            return Err(ParleyError::DimensionMismatch {
                expected: pinned,
                actual: dimensions,
            });
        }

        let writer = Connection::open(&path)
            .await
            .map_err(|e| ParleyError::StoreUnavailable {
                source: Box::new(e),
            })?;
        writer
            .call(move |conn| -> Result<(), rusqlite::Error> {
                apply_connection_pragmas(conn, busy_timeout)?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        let mut readers = Vec::with_capacity(config.read_pool_size);
        for _ in 0..config.read_pool_size.max(1) {
            let reader = Connection::open_with_flags(
                &path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .await
            .map_err(|e| ParleyError::StoreUnavailable {
                source: Box::new(e),
            })?;
            reader
                .call(move |conn| -> Result<(), rusqlite::Error> {
                    conn.busy_timeout(busy_timeout)?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            readers.push(reader);
        }

        info!(
            path = %path,
            dimensions,
            readers = readers.len(),
            wal_mode,
            "turn ledger opened"
        );

        Ok(Self {
            writer,
            readers: ReaderPool::new(readers),
            dimensions,
        })
    }

    /// The single writer connection. Every mutation goes through here.
    pub fn writer(&self) -> &Connection {
        &self.writer
    }

    /// Borrow a reader, waiting while all of them are in use.
    pub async fn reader(&self) -> Result<ReaderGuard<'_>, ParleyError> {
        self.readers.acquire().await
    }

    /// Embedding dimension this database is pinned to.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Checkpoint the WAL so the main database file is self-contained.
    pub async fn close(&self) -> Result<(), ParleyError> {
        self.writer
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

fn apply_connection_pragmas(
    conn: &rusqlite::Connection,
    busy_timeout: Duration,
) -> Result<(), rusqlite::Error> {
    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update(None, "synchronous", "FULL")?;
    Ok(())
}

/// One-shot setup on a plain connection: journal mode, schema, dimension pin.
///
/// Returns the dimension recorded in `store_meta`.
fn prepare(
    path: &str,
    wal_mode: bool,
    busy_timeout: Duration,
    dimensions: usize,
) -> Result<usize, ParleyError> {
    let mut conn = rusqlite::Connection::open(path).map_err(map_sqlite_err)?;
    apply_connection_pragmas(&conn, busy_timeout).map_err(map_sqlite_err)?;

    let journal_mode = if wal_mode { "WAL" } else { "DELETE" };
    let applied: String = conn
        .pragma_update_and_check(None, "journal_mode", journal_mode, |row| row.get(0))
        .map_err(map_sqlite_err)?;
    debug!(journal_mode = %applied, "journal mode set");

    crate::migrations::run_migrations(&mut conn)?;

    conn.execute(
        "INSERT OR IGNORE INTO store_meta (key, value) VALUES (?1, ?2)",
        params![DIMENSIONS_KEY, dimensions.to_string()],
    )
    .map_err(map_sqlite_err)?;

    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM store_meta WHERE key = ?1",
            params![DIMENSIONS_KEY],
            |row| row.get(0),
        )
        .optional()
        .map_err(map_sqlite_err)?;

    match stored {
        Some(value) => value.parse().map_err(|_| {
            ParleyError::Internal(format!("store_meta holds a non-numeric dimension `{value}`"))
        }),
        None => Err(ParleyError::Internal(
            "store_meta lost the embedding dimension".to_string(),
        )),
    }
}
