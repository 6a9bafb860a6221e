// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; nothing is collected unless the host
//! installs a recorder.

use metrics::describe_counter;

use parley_core::Role;

/// Register descriptions for every memory metric.
pub fn register_metrics() {
    describe_counter!("parley_turns_appended_total", "Turns durably recorded");
    describe_counter!(
        "parley_embedding_degraded_total",
        "Embedding calls that failed or timed out and were skipped"
    );
    describe_counter!(
        "parley_similar_queries_total",
        "Semantic retrieval requests"
    );
}

pub fn record_append(role: Role, embedded: bool) {
    metrics::counter!(
        "parley_turns_appended_total",
        "role" => role.as_str(),
        "embedded" => if embedded { "true" } else { "false" }
    )
    .increment(1);
}

/// `op` is the memory operation that skipped embedding (`append`, `similar`).
pub fn record_embedding_degraded(op: &'static str) {
    metrics::counter!("parley_embedding_degraded_total", "op" => op).increment(1);
}

pub fn record_similar_query(degraded: bool) {
    metrics::counter!(
        "parley_similar_queries_total",
        "outcome" => if degraded { "degraded" } else { "ok" }
    )
    .increment(1);
}
