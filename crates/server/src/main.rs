use anyhow::Result;
use axum::serve;
use clap::Parser;
use server::create_app;
use splitter_core::{
    config::{AppConfig, UpstreamProvider},
    proxy::ProxyEngine,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Fault-tolerant JSON-RPC splitter for EVM nodes.
///
/// Every flag overrides the matching value from the configuration file.
#[derive(Debug, Parser)]
#[command(name = "splitter", version, about)]
struct Cli {
    /// Address to listen on, e.g. `127.0.0.1:8545`
    #[arg(long, env = "SPLITTER_LISTEN")]
    listen: Option<SocketAddr>,

    /// Upstream JSON-RPC URL; repeat for every endpoint
    #[arg(long = "eth-rpc", value_name = "URL")]
    eth_rpc: Vec<String>,

    /// Total timeout for one request in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Time after which resolution is attempted without waiting for every endpoint, in
    /// milliseconds
    #[arg(long, value_name = "MS")]
    graceful_timeout: Option<u64>,

    /// How far behind the highest reported block an `eth_blockNumber` answer may be
    #[arg(long)]
    max_blocks_behind: Option<u64>,

    /// Number of agreeing endpoints required for an answer
    #[arg(long)]
    min_responses: Option<usize>,

    /// Answer CORS requests from any origin
    #[arg(long)]
    enable_cors: bool,

    /// Log output format
    #[arg(long, value_parser = ["json", "pretty"])]
    log_format: Option<String>,
}

impl Cli {
    /// Applies command-line overrides on top of the file and environment configuration.
    fn apply(self, config: &mut AppConfig) {
        if let Some(listen) = self.listen {
            config.server.bind_address = listen.ip().to_string();
            config.server.bind_port = listen.port();
        }

        if !self.eth_rpc.is_empty() {
            config.upstreams.providers = self
                .eth_rpc
                .iter()
                .enumerate()
                .map(|(index, url)| UpstreamProvider::from_url(url, index))
                .collect();
        }

        if let Some(timeout) = self.timeout {
            config.consensus.total_timeout_ms = timeout;
        }
        if let Some(graceful_timeout) = self.graceful_timeout {
            config.consensus.graceful_timeout_ms = graceful_timeout;
        }
        if let Some(max_blocks_behind) = self.max_blocks_behind {
            config.consensus.max_blocks_behind = max_blocks_behind;
        }
        if self.min_responses.is_some() {
            config.consensus.min_responses = self.min_responses;
        }
        if self.enable_cors {
            config.server.enable_cors = true;
        }
        if let Some(log_format) = self.log_format {
            config.logging.format = log_format;
        }
    }
}

/// Initializes the logging system based on the configuration.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json();
        registry.with(fmt_layer).init();
    } else {
        // "pretty" and any other format default to pretty logging
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;
    cli.apply(&mut config);
    config.validate().map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

    init_logging(&config);
    info!("Starting RPC splitter");
    debug!(
        upstreams_count = config.upstreams.providers.len(),
        total_timeout_ms = config.consensus.total_timeout_ms,
        graceful_timeout_ms = config.consensus.graceful_timeout_ms,
        max_blocks_behind = config.consensus.max_blocks_behind,
        "Configuration loaded"
    );

    let proxy_engine = Arc::new(
        ProxyEngine::from_config(&config)
            .map_err(|e| anyhow::anyhow!("Proxy engine initialization failed: {e}"))?,
    );
    info!(
        endpoints_count = proxy_engine.endpoint_count(),
        min_responses = proxy_engine.api().dispatcher().min_responses(),
        "Dispatcher initialized"
    );

    let app = create_app(proxy_engine, &config);
    let addr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "RPC server listening");

    if let Err(e) = serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error occurred");
    }

    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(
                error = %e,
                "Failed to install Ctrl+C handler"
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(
                    error = %e,
                    "Failed to install signal handler"
                );

                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
