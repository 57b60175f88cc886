//! Caching forward HTTP proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                  FORWARD PROXY                        │
//!                 │                                                       │
//!  Client Request │  ┌─────────┐   ┌───────────┐   ┌──────────────────┐  │
//!  ───────────────┼─▶│   net   │──▶│   http    │──▶│      cache       │  │
//!                 │  │listener │   │ validate  │   │ (host+path, one  │  │
//!                 │  └─────────┘   │ parse     │   │  fetch per key)  │  │
//!                 │                │ sanitize  │   └────────┬─────────┘  │
//!                 │                └───────────┘            │ miss       │
//!                 │                                         ▼            │
//!  Client Reply   │  ┌─────────────────────────┐   ┌──────────────────┐  │   Origin
//!  ◀──────────────┼──│ reply / 400 / 501 /     │◀──│     origin       │◀─┼── Server
//!                 │  │ sentinel, then close    │   │    forwarder     │  │
//!                 │  └─────────────────────────┘   └──────────────────┘  │
//!                 │                                                       │
//!                 │  config · observability · resilience · lifecycle     │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use caching_proxy::config::{load_config, ProxyConfig};
use caching_proxy::lifecycle::startup;
use caching_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "caching-proxy")]
#[command(about = "Caching forward HTTP proxy", long_about = None)]
struct Cli {
    /// Port to listen on (overrides the configured bind address port)
    port: Option<u16>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(port) = cli.port {
        config = config.with_listen_port(port);
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    logging::init(&config.observability);
    tracing::info!("caching-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await
}
