//! ClubBank CLI: JSON-lines RPC server and one-shot tools.
//!
//! Logs always go to stderr; stdout carries only command output (and, for
//! `serve`, one JSON response per line).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clubbank_engine::Engine;
use clubbank_types::{EngineConfig, LogFormat, constants};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod rpc;

#[derive(Parser)]
#[command(name = "clubbank", version)]
#[command(about = "ClubBank - deadlock-avoiding resource allocation for clubs")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON regardless of the configured format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer JSON-lines requests from stdin until it closes
    Serve,
    /// Load a scenario and print its safety report
    Check {
        #[arg(short, long, default_value = constants::DEFAULT_SCENARIO)]
        scenario: String,
    },
    /// List the built-in scenarios
    Scenarios,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if cli.json_logs {
        config.logging.format = LogFormat::Json;
    }
    init_tracing(&config);

    let engine = Engine::new(config).context("starting engine")?;

    match cli.command {
        Commands::Serve => rpc::serve(Arc::new(engine)).await?,
        Commands::Check { scenario } => {
            let view = engine.load_scenario(&scenario)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
            if !view.safe {
                tracing::warn!(scenario = %scenario, "scenario has no safe sequence");
            }
        }
        Commands::Scenarios => {
            for s in engine.list_scenarios().scenarios {
                println!(
                    "{:<12} {} clubs x {} kinds  [{:?}]  {}",
                    s.name,
                    s.clubs,
                    s.resource_kinds.len(),
                    s.expected,
                    s.description
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(config: &EngineConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.clone().into());

    match config.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
