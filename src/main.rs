//! CORS regex proxy.
//!
//! Forwards every request to one upstream and answers CORS for it. Allowed
//! origins are exact strings, `*` wildcards or regular expressions.
//!
//! ```text
//!   Client ──▶ trace ─▶ request id ─▶ timeout ─▶ CORS ─▶ forward ──▶ Upstream
//!                                                  │
//!                                   OPTIONS ◀──────┘ (200, no body)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_regex_proxy::config::{load_config, validate_config, ProxyConfig};
use cors_regex_proxy::http::HttpServer;
use cors_regex_proxy::lifecycle::{signals, Shutdown};
use cors_regex_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "cors-regex-proxy")]
#[command(about = "Reverse proxy answering CORS with wildcard and regex origin patterns", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and compile origin patterns, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = ProxyConfig::default();
            validate_config(&config).map_err(|errors| {
                cors_regex_proxy::config::ConfigError::Validation(errors)
            })?;
            config
        }
    };

    logging::init(&config.observability);

    tracing::info!(
        name = %config.name,
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        origins = config.cors.allow_origin_list.len(),
        "Configuration loaded"
    );

    // Compiles the origin patterns; a bad one stops startup here.
    let server = HttpServer::new(config.clone())?;

    if cli.check {
        tracing::info!("Configuration OK");
        return Ok(());
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::trigger_on_ctrl_c(shutdown);
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
