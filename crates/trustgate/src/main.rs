// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trustgate - a trust-gated LLM request gateway.
//!
//! This is the binary entry point.

mod ask;
mod providers;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use trustgate_config::GatewayConfig;
use trustgate_core::GatewayError;

/// Trustgate - a trust-gated LLM request gateway.
#[derive(Parser, Debug)]
#[command(name = "trustgate", version, about, long_about = None)]
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
    /// Load and validate configuration, then print a summary.
    CheckConfig,
    /// Probe every configured provider and print its health.
    Providers {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Send one request through the gateway and print the JSON response.
    Ask(ask::AskArgs),
}

fn load_config(path: Option<&PathBuf>) -> Result<GatewayConfig, ExitCode> {
    let loaded = match path {
        Some(path) => trustgate_config::load_and_validate_path(path),
        None => trustgate_config::load_and_validate(),
    };
    loaded.map_err(|errors| {
        trustgate_config::render_errors(&errors);
        ExitCode::FAILURE
    })
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so that command output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("trustgate={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn summarize(config: &GatewayConfig) -> String {
    let mut tiers: Vec<_> = config.policy.tiers.iter().collect();
    tiers.sort_by(|a, b| b.min_trust.total_cmp(&a.min_trust));
    let tier_list = tiers
        .iter()
        .map(|t| format!("{}>={}", t.name, t.min_trust))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "config ok: {} tiers ({tier_list}), {} providers, latency bound {}ms",
        config.policy.tiers.len(),
        config.providers.len(),
        config.latency_bound_ms()
    )
}

fn report(err: &GatewayError) -> ExitCode {
    eprintln!("trustgate: {err}");
    if err.is_caller_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(code) => return code,
    };
    init_tracing(&config.gateway.log_level);
    tracing::debug!(gateway = %config.gateway.name, command = ?cli.command, "starting");

    match cli.command {
        Commands::CheckConfig => {
            println!("{}", summarize(&config));
            ExitCode::SUCCESS
        }
        Commands::Providers { json } => match providers::run_providers(&config, json).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => report(&e),
        },
        Commands::Ask(args) => match ask::run_ask(config, args).await {
            Ok(response) => match serde_json::to_string_pretty(&response) {
                Ok(text) => {
                    println!("{text}");
                    ExitCode::SUCCESS
                }
                Err(e) => report(&GatewayError::Internal(format!("failed to serialize response: {e}"))),
            },
            Err(e) => report(&e),
        },
    }
}
