// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn ledger queries.
//!
//! Writes go through the writer connection; reads borrow a pooled reader.
//! Ordering is always `created_at` then `id`, both assigned by the store.

use rusqlite::params;

use parley_core::{AgentId, NewTurn, ParleyError, Turn, TurnId};

use crate::database::{Database, map_tr_err};
use crate::models::{LedgerStats, TURN_COLUMNS, row_to_turn, vec_to_blob};

/// Insert a turn. The store assigns `id` and `created_at`.
///
/// `created_at` never goes below the agent's latest turn, so a wall clock
/// stepping backwards cannot reorder the ledger.
pub async fn insert_turn(db: &Database, turn: NewTurn) -> Result<TurnId, ParleyError> {
    turn.validate(db.dimensions())?;

    let NewTurn {
        agent_id,
        role,
        content,
        embedding,
    } = turn;
    let blob = embedding.as_deref().map(vec_to_blob);

    db.writer()
        .call(move |conn| -> Result<TurnId, rusqlite::Error> {
            conn.execute(
                "INSERT INTO turns (agent_id, role, content, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, max(
                     strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     coalesce((SELECT max(created_at) FROM turns WHERE agent_id = ?1), '')
                 ))",
                params![agent_id.0, role.as_str(), content, blob],
            )?;
            Ok(TurnId(conn.last_insert_rowid()))
        })
        .await
        .map_err(map_tr_err)
}

/// The `limit` most recent turns of an agent, returned oldest first.
pub async fn recent_turns(
    db: &Database,
    agent_id: &AgentId,
    limit: i64,
) -> Result<Vec<Turn>, ParleyError> {
    if limit <= 0 {
        return Ok(Vec::new());
    }

    let agent_id = agent_id.0.clone();
    db.reader()
        .await?
        .call(move |conn| -> Result<Vec<Turn>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TURN_COLUMNS} FROM (
                     SELECT {TURN_COLUMNS} FROM turns
                     WHERE agent_id = ?1
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?2
                 )
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let turns = stmt
                .query_map(params![agent_id, limit], row_to_turn)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(turns)
        })
        .await
        .map_err(map_tr_err)
}

/// Every turn of an agent, oldest first.
pub async fn all_turns(db: &Database, agent_id: &AgentId) -> Result<Vec<Turn>, ParleyError> {
    let agent_id = agent_id.0.clone();
    db.reader()
        .await?
        .call(move |conn| -> Result<Vec<Turn>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TURN_COLUMNS} FROM turns
                 WHERE agent_id = ?1
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let turns = stmt
                .query_map(params![agent_id], row_to_turn)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(turns)
        })
        .await
        .map_err(map_tr_err)
}

/// Turns of an agent that carry an embedding, newest first.
pub async fn embedded_turns(db: &Database, agent_id: &AgentId) -> Result<Vec<Turn>, ParleyError> {
    let agent_id = agent_id.0.clone();
    db.reader()
        .await?
        .call(move |conn| -> Result<Vec<Turn>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TURN_COLUMNS} FROM turns
                 WHERE agent_id = ?1 AND embedding IS NOT NULL
                 ORDER BY created_at DESC, id DESC"
            ))?;
            let turns = stmt
                .query_map(params![agent_id], row_to_turn)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(turns)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every turn of an agent in one transaction. Returns the count removed.
pub async fn delete_turns(db: &Database, agent_id: &AgentId) -> Result<usize, ParleyError> {
    let agent_id = agent_id.0.clone();
    db.writer()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM turns WHERE agent_id = ?1", params![agent_id])?;
            tx.commit()?;
            Ok(removed)
        })
        .await
        .map_err(map_tr_err)
}

/// Ledger-wide counts.
pub async fn ledger_stats(db: &Database) -> Result<LedgerStats, ParleyError> {
    db.reader()
        .await?
        .call(|conn| -> Result<LedgerStats, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*), COUNT(embedding), COUNT(DISTINCT agent_id) FROM turns",
                [],
                |row| {
                    Ok(LedgerStats {
                        turns: row.get(0)?,
                        embedded: row.get(1)?,
                        agents: row.get(2)?,
                    })
                },
            )
        })
        .await
        .map_err(map_tr_err)
}
