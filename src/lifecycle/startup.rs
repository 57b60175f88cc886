//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Bind the listener and begin accepting traffic
//! - Wire OS signals to graceful shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use crate::config::ProxyConfig;
use crate::http::ProxyServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::Listener;
use crate::observability::metrics;

/// Run the proxy until a shutdown signal arrives.
///
/// Expects logging to be initialized already.
pub async fn run(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        cache_enabled = config.cache.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    ProxyServer::new(&config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
