//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the forward proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, connection cap).
    pub listener: ListenerConfig,

    /// How requests are read from clients.
    pub client: ClientConfig,

    /// How requests are forwarded to origin servers.
    pub origin: OriginConfig,

    /// Response cache settings.
    pub cache: CacheConfig,

    /// Request acceptance policy.
    pub request: RequestPolicyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Replace the port of the configured bind address.
    ///
    /// Used by the binary for the positional port argument.
    pub fn with_listen_port(mut self, port: u16) -> Self {
        let host = self
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| self.listener.bind_address.clone());
        self.listener.bind_address = format!("{}:{}", host, port);
        self
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:18888").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// How long shutdown waits for live connections to finish.
    pub drain_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:18888".to_string(),
            max_connections: 1024,
            drain_timeout_secs: 10,
        }
    }
}

/// Client-side receive settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Size of each read from the client socket.
    pub read_chunk_size: usize,

    /// Maximum number of reads before the request is processed anyway.
    pub max_reads: usize,

    /// Deadline for the whole receive phase. `None` waits forever.
    pub read_timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: 1024,
            max_reads: 5,
            read_timeout_secs: Some(10),
        }
    }
}

/// Origin-side forwarding settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Size of each read from the origin socket.
    pub read_chunk_size: usize,

    /// Deadline for reading the full origin response. `None` waits forever.
    pub read_timeout_secs: Option<u64>,
}

impl OriginConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            read_chunk_size: 32 * 1024,
            read_timeout_secs: Some(30),
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve and store origin responses by (host, path).
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// What to do with a Host port suffix that is not a valid port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HostPortPolicy {
    /// Reject the request as `400 Bad Request`.
    #[default]
    Reject,
    /// Ignore the suffix and use port 80.
    DefaultPort,
}

/// Request acceptance policy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RequestPolicyConfig {
    pub host_port_policy: HostPortPolicy,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
