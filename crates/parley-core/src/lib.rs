// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley conversational memory store.
//!
//! This crate provides the trait definitions, error types, vector math and
//! common types shared by the storage, embedding and memory crates.

pub mod error;
pub mod scope;
pub mod traits;
pub mod types;
pub mod vector;

// Re-export key items at crate root for ergonomic imports.
pub use error::{BoxError, ParleyError};
pub use scope::CallScope;
pub use types::{
    AdapterType, AgentId, EmbeddingInput, EmbeddingOutput, HealthStatus, NewTurn, Role,
    ScoredTurn, Turn, TurnId,
};

pub use traits::{
    AgentDirectory, ConversationStore, EmbeddingAdapter, PluginAdapter, ReplyProvider,
    StorageAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        let variants = [
            AdapterType::Storage,
            AdapterType::Embedding,
            AdapterType::Provider,
            AdapterType::AgentDirectory,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }

        let json = serde_json::to_string(&AdapterType::Storage).expect("should serialize");
        let parsed: AdapterType = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(parsed, AdapterType::Storage);
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_traits_are_exported() {
        // Compiles only if every trait is reachable from the crate root.
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
        fn _assert_reply_provider<T: ReplyProvider>() {}
        fn _assert_store<T: ConversationStore>() {}
        fn _assert_directory<T: AgentDirectory>() {}
    }
}
