//! lab-gateway
//!
//! Forwards the game UI's backend calls to the upstream API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser / game UI          ┌──────────────────────────────────────────┐
//!     ───────────────────────────┼─▶ axum Router  /api/*   /_proxy/*       │
//!                                │        │                                 │
//!                                │        ▼                                 │
//!                                │   routing (mount → upstream URI)         │
//!                                │   security (request header filter)       │
//!                                │   resilience (connect / response timeout)│
//!                                │        │                                 │
//!     ◀──────────────────────────┼── relay ◀── hyper-util client ◀─────────┼──── Upstream API
//!                                └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use lab_gateway::config::{self, ObservabilityConfig};
use lab_gateway::lifecycle::{signals, Shutdown};
use lab_gateway::observability::{init_logging, metrics};
use lab_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "lab-gateway")]
#[command(about = "Forwarding gateway for the AI Lab game backend", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overriding the file and environment.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lab-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_override = ?config.upstream.base_url,
        mounts = config.mounts.len(),
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
