// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversational memory for Parley agents.
//!
//! [`MemoryManager`] joins a [`ConversationStore`](parley_core::ConversationStore)
//! and an [`EmbeddingAdapter`](parley_core::EmbeddingAdapter) into two
//! retrieval contracts: a recency window of the latest turns, and semantic
//! retrieval of older turns similar to a query. Embedding is best-effort:
//! when the provider fails, turns are still recorded and similarity lookups
//! come back empty.

pub mod context;
pub mod conversation;
pub mod manager;
pub mod prompt;
pub mod recording;

pub use context::ConversationContext;
pub use conversation::{Conversation, Exchange};
pub use manager::MemoryManager;
pub use prompt::{format_transcript, render};
