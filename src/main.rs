//! Marketplace gateway binary.
//!
//! ```text
//!  browser ──▶ gateway ─────────────────────────────────────────▶ backend API
//!              /api/proxy/{*path}   + Authorization: Bearer <cookie>
//!              /healthz
//! ```
//!
//! Startup order: `.env` → config (file and/or environment) → logging →
//! metrics → listener → server. Any startup error is fatal.

use std::net::SocketAddr;
use std::path::PathBuf;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use marketplace_gateway::config::{self, watcher::ConfigWatcher, GatewayConfig};
use marketplace_gateway::lifecycle::{self, Shutdown};
use marketplace_gateway::observability::{logging, metrics};
use marketplace_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "marketplace-gateway", version)]
#[command(about = "Same-origin proxy in front of the marketplace backend API", long_about = None)]
struct Args {
    /// Optional TOML config file. Environment variables override its values.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Reload the config file when it changes.
    #[arg(long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let config: GatewayConfig = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::load_from_env()?,
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "marketplace-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        mount_path = %config.proxy.mount_path,
        timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run(config.clone())?), updates)
        }
        _ => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        lifecycle::wait_for_signal().await;
        signal_shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
