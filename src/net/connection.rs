//! Per-connection state and live-connection accounting.
//!
//! # Responsibilities
//! - Name each client connection for log correlation
//! - Model the one-exchange lifecycle (Receiving → Processing → Responding → Closed)
//! - Count live connections so shutdown can wait for them

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::observability::metrics;

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection number, shown as `conn-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Where a client connection is in its single request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Reading the raw request from the client.
    Receiving,
    /// Validating, parsing and sanitizing.
    Processing,
    /// Writing a cached, forwarded or error response.
    Responding,
    /// Socket shut down; nothing more is sent.
    Closed,
}

impl ConnectionState {
    /// The state that follows this one. `Closed` is terminal.
    pub fn next(self) -> Self {
        match self {
            ConnectionState::Receiving => ConnectionState::Processing,
            ConnectionState::Processing => ConnectionState::Responding,
            ConnectionState::Responding | ConnectionState::Closed => ConnectionState::Closed,
        }
    }
}

#[derive(Debug, Default)]
struct Live {
    count: AtomicU64,
    idle: Notify,
}

/// Counts open client connections.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    live: Arc<Live>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection; it counts as live until the guard drops.
    pub fn track(&self) -> ConnectionGuard {
        self.live.count.fetch_add(1, Ordering::SeqCst);
        metrics::connection_opened();
        ConnectionGuard {
            live: Arc::clone(&self.live),
            id: ConnectionId::next(),
        }
    }

    pub fn active_count(&self) -> u64 {
        self.live.count.load(Ordering::SeqCst)
    }

    /// Resolve once no connection is live.
    pub async fn wait_for_idle(&self) {
        loop {
            // Registered before the check so a drop in between is not missed.
            let idle = self.live.idle.notified();
            if self.active_count() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// Keeps one connection counted as live.
#[derive(Debug)]
pub struct ConnectionGuard {
    live: Arc<Live>,
    id: ConnectionId,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.live.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.live.idle.notify_waiters();
        }
        metrics::connection_closed();
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}
