// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded pool of read-only connections.
//!
//! The pool size is fixed at open and independent of how many callers are
//! reading. Under saturation `acquire` waits on a semaphore; it never opens
//! extra connections.

use std::ops::Deref;
use std::sync::{Mutex, PoisonError};

use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_rusqlite::Connection;

use parley_core::ParleyError;

pub struct ReaderPool {
    idle: Mutex<Vec<Connection>>,
    permits: Semaphore,
    size: usize,
}

impl ReaderPool {
    pub fn new(connections: Vec<Connection>) -> Self {
        let size = connections.len();
        Self {
            idle: Mutex::new(connections),
            permits: Semaphore::new(size),
            size,
        }
    }

    /// Total number of reader connections.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Connections not currently lent out.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a free reader.
    pub async fn acquire(&self) -> Result<ReaderGuard<'_>, ParleyError> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ParleyError::store("reader pool closed"))?;
        let conn = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .ok_or_else(|| ParleyError::Internal("reader pool permit without connection".into()))?;
        Ok(ReaderGuard {
            pool: self,
            conn,
            _permit: permit,
        })
    }

    fn release(&self, conn: Connection) {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(conn);
    }
}

/// A borrowed reader. Returned to the pool on drop.
pub struct ReaderGuard<'a> {
    pool: &'a ReaderPool,
    conn: Connection,
    // Dropped after `Drop::drop` has returned the connection.
    _permit: SemaphorePermit<'a>,
}

impl Deref for ReaderGuard<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for ReaderGuard<'_> {
    fn drop(&mut self) {
        // Handles are cheap clones of the same background connection.
        self.pool.release(self.conn.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn pool(size: usize) -> ReaderPool {
        let mut conns = Vec::new();
        for _ in 0..size {
            conns.push(Connection::open_in_memory().await.unwrap());
        }
        ReaderPool::new(conns)
    }

    #[tokio::test]
    async fn guard_returns_connection_on_drop() {
        let pool = pool(2).await;
        assert_eq!(pool.available(), 2);
        {
            let _a = pool.acquire().await.unwrap();
            let _b = pool.acquire().await.unwrap();
            assert_eq!(pool.available(), 0);
        }
        assert_eq!(pool.available(), 2);
        assert_eq!(pool.size(), 2);
    }

    #[tokio::test]
    async fn saturated_pool_waits_instead_of_failing() {
        let pool = pool(1).await;
        let held = pool.acquire().await.unwrap();

        let waiting = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(waiting.is_err(), "second acquire should block while the only reader is held");

        drop(held);
        let guard = tokio::time::timeout(Duration::from_secs(5), pool.acquire())
            .await
            .expect("reader freed")
            .unwrap();
        let one: i64 = guard
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(one, 1);
    }
}
