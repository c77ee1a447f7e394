//! EazyBank Edge Gateway
//!
//! The single entry point in front of the EazyBank microservices
//! (account, card, loan), built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌────────────────────────────────────────────────────┐
//!                       │                   EDGE GATEWAY                      │
//!                       │                                                     │
//!   Client Request      │  ┌─────────┐   ┌──────────┐   ┌─────────────────┐  │
//!   ────────────────────┼─▶│  http   │──▶│ routing  │──▶│ circuit breaker │  │
//!                       │  │ server  │   │  table   │   │      gate       │  │
//!                       │  └─────────┘   └──────────┘   └────────┬────────┘  │
//!                       │                                 denied │ allowed   │
//!                       │                  ┌──────────┐◀─────────┤           │
//!                       │                  │ fallback │          ▼           │
//!   Client Response     │  ┌─────────┐     │ handler  │   ┌────────────┐     │
//!   ◀───────────────────┼──│ response│◀────┴──────────┴───│  upstream  │◀────┼── Backend
//!                       │  │ filters │                    │ forwarder  │     │   Service
//!                       │  └─────────┘                    └────────────┘     │
//!                       │                                                     │
//!                       │  ┌────────────────────────────────────────────────┐ │
//!                       │  │            Cross-Cutting Concerns               │ │
//!                       │  │  ┌─────────┐  ┌─────────────┐  ┌────────────┐  │ │
//!                       │  │  │ config  │  │observability│  │ lifecycle  │  │ │
//!                       │  │  └─────────┘  └─────────────┘  └────────────┘  │ │
//!                       │  └────────────────────────────────────────────────┘ │
//!                       └────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use eazybank_gateway::config::load_config;
use eazybank_gateway::lifecycle::Shutdown;
use eazybank_gateway::observability::{logging, metrics};
use eazybank_gateway::HttpServer;

#[derive(Parser)]
#[command(
    name = "eazybank-gateway",
    about = "Edge gateway for the EazyBank microservices",
    version
)]
struct Cli {
    /// Path to the gateway configuration file.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        services = config.services.len(),
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
