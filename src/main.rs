//! Round-robin HTTP gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!   servers.json ──────┼─▶ ConfigWatcher ──ReloadEvent──▶ reload loop   │
//!   SIGHUP / admin ────┼─────────────────────┘                │         │
//!                      │                                      ▼         │
//!                      │                              ServerRegistry    │
//!                      │                               (ArcSwap list)   │
//!                      │                                      │         │
//!   Client Request ────┼─▶ axum ─▶ ForwardingProxy ─▶ RoundRobinSelector│
//!                      │                 │                              │
//!                      │                 ▼                              │
//!   Client Response ◀──┼──────── relay / 502 / 503 ◀────────────────────┼──── Backend
//!                      └───────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use rr_gateway::admin::{self, AdminState};
use rr_gateway::config::loader::load_config;
use rr_gateway::config::validation::validate_config;
use rr_gateway::config::{
    ConfigError, ConfigWatcher, FileSource, GatewayConfig, InlineSource, ServerSource,
};
use rr_gateway::http::HttpServer;
use rr_gateway::lifecycle::{signals, Shutdown};
use rr_gateway::load_balancer::ServerRegistry;
use rr_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "rr-gateway")]
#[command(about = "Round-robin HTTP gateway with live server list reload", long_about = None)]
struct Args {
    /// Gateway settings file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server list file (JSON), overrides `servers.path`.
    #[arg(short, long)]
    servers: Option<PathBuf>,

    /// Server list as inline JSON, e.g. `[{"host":"http://localhost:3001"}]`.
    /// Nothing is watched; SIGHUP re-applies the same list.
    #[arg(long, conflicts_with = "servers")]
    servers_json: Option<String>,

    /// Listen address, overrides `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

impl Args {
    /// Where the server list comes from, and whether it is a file to watch.
    fn server_source(&self, config: &GatewayConfig) -> (Arc<dyn ServerSource>, bool) {
        match &self.servers_json {
            Some(raw) => (Arc::new(InlineSource::new(raw.clone())), false),
            None => (
                Arc::new(FileSource::new(&config.servers.path)),
                config.servers.watch,
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(servers) = &args.servers {
        config.servers.path = servers.display().to_string();
    }
    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);
    let (source, watch) = args.server_source(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "rr-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        servers = %source.describe(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    // Initial load. A missing or broken list is not fatal: start empty and
    // let the next reload fill it in.
    let registry = Arc::new(ServerRegistry::empty());
    if registry.reload(source.as_ref()).is_err() {
        tracing::warn!("Starting with an empty server pool");
    }

    let (watcher, reload_rx) = ConfigWatcher::new(Path::new(&config.servers.path));
    let watcher = watcher.with_poll_interval(std::time::Duration::from_secs(
        config.servers.poll_interval_secs,
    ));
    let reload_tx = watcher.sender();
    let _watch_guard = if watch {
        match watcher.run() {
            Ok(guard) => Some(guard),
            Err(e) => {
                tracing::error!(error = %e, "Failed to start server list watcher, reload via SIGHUP only");
                None
            }
        }
    } else {
        None
    };

    let shutdown = Shutdown::new();
    tokio::spawn(signals::listen(shutdown.clone(), reload_tx.clone()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config.clone(), registry, source);

    if config.admin.enabled {
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState {
            selector: server.selector().clone(),
            reload_tx: reload_tx.clone(),
        };
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = admin::serve(admin_listener, state, admin_shutdown).await {
                tracing::error!(error = %e, "Admin API failed");
            }
        });
    }
    drop(reload_tx);

    server.run(listener, reload_rx, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
