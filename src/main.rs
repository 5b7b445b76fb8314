//! Versioned Router
//!
//! Serves the bundled greeting routes behind the version-aware routing engine.
//!
//! ```text
//!     Client Request ──▶ axum ──▶ RequestDescriptor ──▶ Router::resolve ──▶ handler
//!                                                           │
//!                                                           └──▶ advisory channel ──▶ WARN log
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use versioned_router::config::{load_config, ServerConfig};
use versioned_router::lifecycle::{signals, startup, Shutdown};
use versioned_router::observability::{logging, metrics};
use versioned_router::routing::notifier::{run_advisory_sink, ChannelNotifier};
use versioned_router::HttpServer;

#[derive(Parser)]
#[command(name = "versioned-router")]
#[command(about = "Version-aware HTTP route resolution", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "VERSIONED_ROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        "versioned-router starting"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let shutdown = Shutdown::new();
    let (notifier, advisories) = ChannelNotifier::channel(config.advisories.channel_capacity);
    let sink = tokio::spawn(run_advisory_sink(advisories, shutdown.subscribe()));

    let router = Arc::new(startup::build_router(&config, Arc::new(notifier))?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, router);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::shutdown_signal().await;
    shutdown.trigger();

    server_task.await??;
    sink.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
