// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite and the core turn types.
//!
//! Embeddings are little-endian `f32` BLOBs. An absent vector is SQL NULL.

use std::str::FromStr;

use rusqlite::types::Type;

use parley_core::{AgentId, Role, Turn, TurnId};

/// Column list shared by every turn query, in [`row_to_turn`] order.
pub(crate) const TURN_COLUMNS: &str = "id, agent_id, role, content, embedding, created_at";

/// Convert f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert SQLite BLOB back to f32 vector. A trailing partial value is ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Aggregate counts reported by the ledger health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerStats {
    pub turns: i64,
    pub embedded: i64,
    pub agents: i64,
}

pub(crate) fn row_to_turn(row: &rusqlite::Row<'_>) -> Result<Turn, rusqlite::Error> {
    let role: String = row.get(2)?;
    let role = Role::from_str(&role)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    let embedding: Option<Vec<u8>> = row.get(4)?;

    Ok(Turn {
        id: TurnId(row.get(0)?),
        agent_id: AgentId(row.get(1)?),
        role,
        content: row.get(3)?,
        embedding: embedding.map(|blob| blob_to_vec(&blob)),
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_preserves_values_bit_for_bit() {
        let original = vec![1.5f32, -0.0, f32::MIN_POSITIVE, 3.25e8];
        let blob = vec_to_blob(&original);
        assert_eq!(blob.len(), 16);
        let recovered = blob_to_vec(&blob);
        for (a, b) in original.iter().zip(recovered.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn blob_is_little_endian() {
        assert_eq!(vec_to_blob(&[1.0]), vec![0x00, 0x00, 0x80, 0x3f]);
    }

    #[test]
    fn empty_vector_is_empty_blob() {
        assert!(vec_to_blob(&[]).is_empty());
        assert!(blob_to_vec(&[]).is_empty());
    }
}
