//! Feedback API Gateway
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────┐
//!                         │                   GATEWAY                     │
//!   Client Request        │  ┌──────────┐   ┌──────────┐   ┌──────────┐   │
//!   ──────────────────────┼─▶│request id│──▶│  auth    │──▶│ routing  │   │
//!                         │  │ + trace  │   │ (JWT)    │   │ (prefix) │   │
//!                         │  └──────────┘   └────┬─────┘   └────┬─────┘   │
//!                         │              403/401 │              │ 404     │
//!                         │                      ▼              ▼         │
//!   Client Response       │               ┌────────────────────────────┐  │
//!   ◀─────────────────────┼───────────────│ proxy: x-user, Host, URI   │◀─┼──── Upstream
//!                         │               │ rewrite, deadline (502/504)│──┼───▶ Service
//!                         │               └────────────────────────────┘  │
//!                         └───────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use feedback_gateway::config::LogFormat;
use feedback_gateway::lifecycle::signals::spawn_signal_listener;
use feedback_gateway::observability::{logging, metrics};
use feedback_gateway::{GatewayConfig, GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "feedback-gateway")]
#[command(about = "Authenticating API gateway for the feedback services", long_about = None)]
struct Cli {
    /// TOML route table (overrides GATEWAY_ROUTES_FILE)
    #[arg(short, long)]
    routes: Option<PathBuf>,

    /// Validate configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match GatewayConfig::from_env(cli.routes.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init(LogFormat::Pretty);
            tracing::error!(error = %e, "Invalid configuration, refusing to start");
            return Err(e.into());
        }
    };
    logging::init(config.observability.log_format);

    tracing::info!("feedback-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        issuer = %config.auth.issuer,
        routes = config.routes.len(),
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if cli.check {
        for route in &config.routes {
            println!(
                "{} {} -> {} methods={:?} strip_prefix={}",
                route.name, route.path_prefix, route.upstream, route.methods, route.strip_prefix
            );
        }
        println!("configuration OK");
        return Ok(());
    }

    if let Some(address) = &config.observability.metrics_address {
        let addr: SocketAddr = address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    let server = GatewayServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
