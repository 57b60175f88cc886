//! Logs and metrics.
//!
//! # Data Flow
//! ```text
//! connection span (id, peer)
//!     → logging.rs: tracing subscriber, pretty or JSON on stdout
//! request outcomes, cache lookups, origin fetches, live connections
//!     → metrics.rs: Prometheus exporter when enabled, no-op otherwise
//! ```

pub mod logging;
pub mod metrics;
