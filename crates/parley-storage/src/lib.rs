// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite turn ledger for the Parley memory store.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single
//! writer connection, a bounded pool of readers, and exact-scan cosine
//! retrieval over stored embeddings.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use models::{LedgerStats, blob_to_vec, vec_to_blob};
