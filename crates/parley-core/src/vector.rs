// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector similarity math for semantic retrieval.
//!
//! Cosine compares direction only, so magnitude drift between provider
//! calls does not bias relevance. Accumulation is done in `f64`.

use std::cmp::Ordering;

use crate::error::ParleyError;
use crate::types::{ScoredTurn, Turn};

/// Cosine similarity in `[-1, 1]`.
///
/// A zero-magnitude operand has no direction; its similarity to anything is 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, ParleyError> {
    if a.len() != b.len() {
        return Err(ParleyError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    Ok(similarity.clamp(-1.0, 1.0) as f32)
}

/// Cosine distance, `1 - cosine_similarity`, in `[0, 2]`. Lower is closer.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32, ParleyError> {
    cosine_similarity(a, b).map(|s| 1.0 - s)
}

/// Rank candidate turns by cosine distance to `query`.
///
/// Candidates without an embedding are skipped. Equal distances put the
/// newer turn first (later `created_at`, then higher id), so repeated
/// identical inputs always give the same order. At most `k` results.
pub fn rank(
    query: &[f32],
    candidates: impl IntoIterator<Item = Turn>,
    k: usize,
) -> Result<Vec<ScoredTurn>, ParleyError> {
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut scored = Vec::new();
    for turn in candidates {
        let Some(embedding) = turn.embedding.as_deref() else {
            continue;
        };
        let distance = cosine_distance(query, embedding)?;
        scored.push(ScoredTurn { turn, distance });
    }

    scored.sort_by(compare_scored);
    scored.truncate(k);
    Ok(scored)
}

/// Ascending distance, then newest first.
fn compare_scored(a: &ScoredTurn, b: &ScoredTurn) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| b.turn.created_at.cmp(&a.turn.created_at))
        .then_with(|| b.turn.id.cmp(&a.turn.id))
}
