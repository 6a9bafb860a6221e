// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that serde attributes cannot express,
//! such as non-empty paths, positive sizes, and URL schemes.

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.storage.read_pool_size < 1 {
        fail("storage.read_pool_size must be at least 1".to_string());
    }

    if config.embedding.dimensions < 1 {
        fail("embedding.dimensions must be at least 1".to_string());
    }

    let api_base = config.embedding.api_base.trim();
    if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
        fail(format!(
            "embedding.api_base `{api_base}` must be an http:// or https:// URL"
        ));
    }

    if config.embedding.model.trim().is_empty() {
        fail("embedding.model must not be empty".to_string());
    }

    if config.embedding.timeout_secs < 1 {
        fail("embedding.timeout_secs must be at least 1".to_string());
    }

    if config.memory.context_size < 0 {
        fail(format!(
            "memory.context_size must be non-negative, got {}",
            config.memory.context_size
        ));
    }

    if config.memory.similar_results < 0 {
        fail(format!(
            "memory.similar_results must be non-negative, got {}",
            config.memory.similar_results
        ));
    }

    if config.memory.embedding_timeout_ms < 1 {
        fail("memory.embedding_timeout_ms must be at least 1".to_string());
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "logging.level `{}` is not one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &ParleyConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&ParleyConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = ParleyConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = ParleyConfig::default();
        config.storage.read_pool_size = 0;
        config.embedding.dimensions = 0;
        config.embedding.api_base = "ftp://example.com".to_string();
        config.logging.level = "loud".to_string();

        let messages = messages(&config);
        assert_eq!(messages.len(), 4, "got {messages:?}");
        assert!(messages.iter().any(|m| m.contains("read_pool_size")));
        assert!(messages.iter().any(|m| m.contains("dimensions")));
        assert!(messages.iter().any(|m| m.contains("api_base")));
        assert!(messages.iter().any(|m| m.contains("loud")));
    }

    #[test]
    fn negative_windows_fail_validation() {
        let mut config = ParleyConfig::default();
        config.memory.context_size = -1;
        config.memory.similar_results = -3;
        let messages = messages(&config);
        assert!(messages.iter().any(|m| m.contains("context_size")));
        assert!(messages.iter().any(|m| m.contains("similar_results")));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = ParleyConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
