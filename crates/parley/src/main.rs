// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - conversational memory store.
//!
//! Binary entry point: admin and debug commands over an agent's turn ledger.

mod commands;
mod doctor;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use parley_config::ParleyConfig;
use parley_core::{AgentId, CallScope, Role};

/// Parley - conversational memory store.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a turn for an agent.
    Append {
        agent: String,
        #[arg(value_parser = parse_role)]
        role: Role,
        content: String,
    },
    /// Show the most recent turns, oldest first.
    Recent {
        agent: String,
        /// Window size (defaults to memory.context_size).
        #[arg(short = 'n', long)]
        limit: Option<i64>,
    },
    /// Dump an agent's full history.
    History {
        agent: String,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Find turns similar to a query.
    Search {
        agent: String,
        query: String,
        /// Number of results (defaults to memory.similar_results).
        #[arg(short = 'k', long)]
        k: Option<i64>,
    },
    /// Delete an agent's history.
    Clear { agent: String },
    /// Check configuration, storage, and embedding provider.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::parse(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => parley_config::load_and_validate_path(path),
        None => parley_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);
    parley_memory::recording::register_metrics();

    let shutdown = CancellationToken::new();
    install_ctrl_c(shutdown.clone());
    let scope = CallScope::background().with_cancellation(shutdown);

    if let Err(e) = run(cli.command, &config, &scope).await {
        eprintln!("parley: {e}");
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config: &ParleyConfig,
    scope: &CallScope,
) -> Result<(), parley_core::ParleyError> {
    if let Commands::Doctor { plain } = command {
        return doctor::run_doctor(config, plain).await;
    }

    let app = commands::App::open(config).await?;
    let output = match command {
        Commands::Append {
            agent,
            role,
            content,
        } => app.append(scope, &AgentId::new(agent), role, &content).await,
        Commands::Recent { agent, limit } => app.recent(scope, &AgentId::new(agent), limit).await,
        Commands::History { agent, json } => app.history(scope, &AgentId::new(agent), json).await,
        Commands::Search { agent, query, k } => {
            app.search(scope, &AgentId::new(agent), &query, k).await
        }
        Commands::Clear { agent } => app.clear(scope, &AgentId::new(agent)).await,
        Commands::Doctor { .. } => Ok(String::new()),
    };
    let closed = app.close().await;

    println!("{}", output?);
    closed
}

/// Cancel `token` on the first Ctrl+C.
fn install_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            token.cancel();
        }
    });
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
