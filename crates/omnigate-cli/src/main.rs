//! Omnigate CLI — entry point.
//!
//! # Commands
//!
//! - `omnigate serve [--config PATH] [--host H] [--port P]` — run the HTTP gateway
//! - `omnigate providers [--config PATH]` — show the provider catalog and what is configured

mod helpers;
mod status;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use omnigate_core::config::load_config;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Omnigate — one gateway in front of many generative AI and vector store backends
#[derive(Parser)]
#[command(name = "omnigate", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Config file (JSON or .properties). Defaults to ~/.omnigate/config.json
        #[arg(short, long)]
        config: Option<String>,

        /// Override `server.host`
        #[arg(long)]
        host: Option<String>,

        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show the provider catalog and configuration status
    Providers {
        /// Config file (JSON or .properties). Defaults to ~/.omnigate/config.json
        #[arg(short, long)]
        config: Option<String>,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, host, port } => {
            init_logging(cli.logs, cli.json);
            run_serve(config, host, port).await
        }
        Commands::Providers { config } => {
            init_logging(cli.logs, cli.json);
            status::run(config_path(config).as_deref())
        }
    }
}

fn config_path(arg: Option<String>) -> Option<PathBuf> {
    arg.map(|p| helpers::expand_tilde(&p))
}

async fn run_serve(config: Option<String>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load_config(config_path(config).as_deref())?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    helpers::print_banner(&config.bind_address());
    info!(address = %config.bind_address(), "starting gateway");
    omnigate_gateway::start_server(&config).await
}

/// Initialize tracing/logging. `RUST_LOG` wins over the flags.
fn init_logging(verbose: bool, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("omnigate=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
