// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley doctor` command implementation.
//!
//! Checks the loaded configuration, the turn ledger, and the embedding
//! provider, then prints one line per check.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use parley_config::ParleyConfig;
use parley_core::{
    EmbeddingAdapter, EmbeddingInput, HealthStatus, ParleyError, PluginAdapter, StorageAdapter,
};
use parley_openai::OpenAiEmbedder;
use parley_storage::SqliteStorage;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run every check and print a report. With `plain`, colors are disabled.
pub async fn run_doctor(config: &ParleyConfig, plain: bool) -> Result<(), ParleyError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_config(config),
        check_database(config).await,
        check_embedding(config).await,
    ];

    println!();
    println!("  parley doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", format_line(result, use_color));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal().to_string()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow().to_string()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red().to_string()),
        };
        format!(
            "    {symbol} {:<20} {message} ({duration_ms}ms)",
            result.name
        )
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

fn check_config(config: &ParleyConfig) -> CheckResult {
    let start = Instant::now();
    CheckResult::new(
        "Configuration",
        CheckStatus::Pass,
        format!(
            "valid (dimensions={}, context_size={})",
            config.embedding.dimensions, config.memory.context_size
        ),
        start,
    )
}

async fn check_database(config: &ParleyConfig) -> CheckResult {
    let start = Instant::now();
    let db_path = &config.storage.database_path;

    if !std::path::Path::new(db_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first use)"),
            start,
        );
    }

    let storage =
        match SqliteStorage::open(config.storage.clone(), config.embedding.dimensions).await {
            Ok(storage) => storage,
            Err(e) => return CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start),
        };

    let result = match (storage.health_check().await, storage.stats().await) {
        (Ok(HealthStatus::Healthy), Ok(stats)) => CheckResult::new(
            "Database",
            CheckStatus::Pass,
            format!(
                "{} turns ({} embedded) across {} agents",
                stats.turns, stats.embedded, stats.agents
            ),
            start,
        ),
        (Ok(HealthStatus::Degraded(msg)), _) => {
            CheckResult::new("Database", CheckStatus::Warn, msg, start)
        }
        (Ok(HealthStatus::Unhealthy(msg)), _) => {
            CheckResult::new("Database", CheckStatus::Fail, msg, start)
        }
        (Err(e), _) | (_, Err(e)) => {
            CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start)
        }
    };
    if let Err(e) = storage.close().await {
        tracing::warn!(error = %e, "failed to close ledger after doctor check");
    }
    result
}

async fn check_embedding(config: &ParleyConfig) -> CheckResult {
    let start = Instant::now();

    let embedder = match OpenAiEmbedder::new(&config.embedding) {
        Ok(embedder) => embedder,
        Err(e) => return CheckResult::new("Embedding API", CheckStatus::Fail, e.to_string(), start),
    };

    match embedder.health_check().await {
        Ok(HealthStatus::Healthy) => {}
        Ok(HealthStatus::Degraded(msg)) => {
            return CheckResult::new("Embedding API", CheckStatus::Warn, msg, start);
        }
        Ok(HealthStatus::Unhealthy(msg)) => {
            return CheckResult::new("Embedding API", CheckStatus::Fail, msg, start);
        }
        Err(e) => return CheckResult::new("Embedding API", CheckStatus::Fail, e.to_string(), start),
    }

    match embedder.embed(EmbeddingInput::single("parley doctor")).await {
        Ok(output) => CheckResult::new(
            "Embedding API",
            CheckStatus::Pass,
            format!("reachable ({}, {} dimensions)", config.embedding.model, output.dimensions),
            start,
        ),
        Err(e) => CheckResult::new("Embedding API", CheckStatus::Fail, e.to_string(), start),
    }
}
