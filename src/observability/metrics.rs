//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by outcome
//! - `proxy_cache_lookups_total` (counter): cache hits and misses
//! - `proxy_origin_failures_total` (counter): forwarder failures by kind
//! - `proxy_origin_fetch_duration_seconds` (histogram): origin fetch latency
//! - `proxy_active_connections` (gauge): current connection count

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::cache::CacheStatus;

/// How a client request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Forwarded,
    Cached,
    BadRequest,
    NotImplemented,
    OriginError,
}

impl RequestOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestOutcome::Forwarded => "forwarded",
            RequestOutcome::Cached => "cached",
            RequestOutcome::BadRequest => "bad_request",
            RequestOutcome::NotImplemented => "not_implemented",
            RequestOutcome::OriginError => "origin_error",
        }
    }
}

/// Install the Prometheus exporter with an HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(outcome: RequestOutcome) {
    metrics::counter!("proxy_requests_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_cache_lookup(status: CacheStatus) {
    let result = match status {
        CacheStatus::Hit => "hit",
        CacheStatus::Miss => "miss",
    };
    metrics::counter!("proxy_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_origin_failure(kind: &'static str) {
    metrics::counter!("proxy_origin_failures_total", "kind" => kind).increment(1);
}

pub fn record_origin_fetch(start: Instant) {
    metrics::histogram!("proxy_origin_fetch_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn connection_opened() {
    metrics::gauge!("proxy_active_connections").increment(1.0);
}

pub fn connection_closed() {
    metrics::gauge!("proxy_active_connections").decrement(1.0);
}
