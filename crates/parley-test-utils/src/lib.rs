// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley integration tests.
//!
//! Provides mock adapters and a temp-database harness for fast,
//! deterministic tests without external services.
//!
//! # Components
//!
//! - [`MockEmbedder`] - Deterministic keyword-bucket embeddings
//! - [`FailingEmbedder`] - Simulated embedding provider outage
//! - [`MockReplyProvider`] - Text-generation provider with queued replies
//! - [`StaticAgentDirectory`] - Fixed set of known agents
//! - [`TempLedger`] - SQLite turn ledger in a temp directory

pub mod harness;
pub mod mock_agents;
pub mod mock_embedder;
pub mod mock_provider;

pub use harness::TempLedger;
pub use mock_agents::StaticAgentDirectory;
pub use mock_embedder::{FailingEmbedder, MockEmbedder};
pub use mock_provider::MockReplyProvider;
