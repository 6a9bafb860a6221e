// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley memory store.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Turn ledger settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Embedding provider settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Memory manager settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SQLite ledger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for concurrent reads.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Number of reader connections. Callers beyond this wait for a free one.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,

    /// How long a connection waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            read_pool_size: default_read_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("parley").join("parley.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("parley.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_read_pool_size() -> usize {
    4
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// OpenAI-compatible embeddings endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Base URL, without the `/embeddings` suffix.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimension produced by `model`. Pinned by the store on first open.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient statuses (429, 500, 503).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_dimensions() -> usize {
    1536
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    1
}

/// Memory manager configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Recency window: how many recent turns form short-term context.
    #[serde(default = "default_context_size")]
    pub context_size: i64,

    /// Default number of semantically similar turns to retrieve.
    #[serde(default = "default_similar_results")]
    pub similar_results: i64,

    /// Budget for the best-effort embedding call, in milliseconds.
    #[serde(default = "default_embedding_timeout_ms")]
    pub embedding_timeout_ms: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            context_size: default_context_size(),
            similar_results: default_similar_results(),
            embedding_timeout_ms: default_embedding_timeout_ms(),
        }
    }
}

fn default_context_size() -> i64 {
    10
}

fn default_similar_results() -> i64 {
    3
}

fn default_embedding_timeout_ms() -> u64 {
    10_000
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ParleyConfig::default();
        assert!(config.storage.database_path.ends_with("parley.db"));
        assert!(config.storage.wal_mode);
        assert_eq!(config.storage.read_pool_size, 4);
        assert_eq!(config.embedding.model, "text-embedding-ada-002");
        assert_eq!(config.embedding.dimensions, 1536);
        assert_eq!(config.memory.context_size, 10);
        assert_eq!(config.memory.similar_results, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: ParleyConfig = toml::from_str(
            r#"
[memory]
context_size = 4
"#,
        )
        .unwrap();
        assert_eq!(config.memory.context_size, 4);
        assert_eq!(config.memory.similar_results, 3);
        assert_eq!(config.embedding.dimensions, 1536);
    }

    #[test]
    fn unknown_embedding_field_is_rejected() {
        let result = toml::from_str::<ParleyConfig>(
            r#"
[embedding]
dimension = 384
"#,
        );
        assert!(result.is_err());
    }
}
