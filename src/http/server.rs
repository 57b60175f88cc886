//! Proxy server and per-connection handling.
//!
//! # Responsibilities
//! - Accept client connections and run each on its own task
//! - Receive the raw request under a bounded read budget
//! - Dispatch to the request pipeline, the cache and the origin forwarder
//! - Write exactly one reply, then close the connection
//! - Drain live connections on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::cache::{CacheStatus, ResponseCache};
use crate::config::{ClientConfig, ProxyConfig};
use crate::http::pipeline::process;
use crate::http::request::Request;
use crate::http::response::ErrorResponse;
use crate::http::validator::Validator;
use crate::net::{ConnectionState, ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics::{self, RequestOutcome};
use crate::origin::{ForwardError, OriginForwarder, OriginResponse};
use crate::resilience::with_deadline;

const TERMINATOR: &[u8] = b"\r\n\r\n";
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Everything a connection task needs, shared by all of them.
#[derive(Debug)]
pub struct ProxyContext {
    pub validator: Validator,
    /// `None` when caching is disabled.
    pub cache: Option<ResponseCache>,
    pub forwarder: OriginForwarder,
    pub client: ClientConfig,
}

impl ProxyContext {
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            validator: Validator::new(config.request.host_port_policy),
            cache: config.cache.enabled.then(ResponseCache::new),
            forwarder: OriginForwarder::new(config.origin.clone()),
            client: config.client.clone(),
        }
    }
}

/// Forward proxy server.
pub struct ProxyServer {
    context: Arc<ProxyContext>,
    drain_timeout: Duration,
}

impl ProxyServer {
    /// Create a new proxy server with the given configuration.
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            context: Arc::new(ProxyContext::from_config(config)),
            drain_timeout: Duration::from_secs(config.listener.drain_timeout_secs),
        }
    }

    /// Shared state handed to every connection.
    pub fn context(&self) -> Arc<ProxyContext> {
        Arc::clone(&self.context)
    }

    /// Accept connections until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Accept)?;
        tracing::info!(address = %addr, "Proxy server starting");

        let tracker = ConnectionTracker::new();
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer, permit) = match accepted {
                        Ok(conn) => conn,
                        Err(ListenerError::Closed) => return Err(ListenerError::Closed),
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                            continue;
                        }
                    };

                    let guard = tracker.track();
                    let context = Arc::clone(&self.context);
                    let span = tracing::info_span!("connection", id = %guard.id(), peer = %peer);
                    tokio::spawn(
                        async move {
                            serve_connection(stream, peer, &context).await;
                            drop(permit);
                            drop(guard);
                        }
                        .instrument(span),
                    );
                }
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        let live = tracker.active_count();
        if live > 0 {
            tracing::info!(connections = live, "Draining connections");
            if with_deadline(Some(self.drain_timeout), tracker.wait_for_idle())
                .await
                .is_err()
            {
                tracing::warn!(
                    connections = tracker.active_count(),
                    "Drain timeout elapsed with connections still open"
                );
            }
        }

        tracing::info!("Proxy server stopped");
        Ok(())
    }
}

/// What a connection sends back before closing.
#[derive(Debug)]
enum Reply {
    Error(ErrorResponse),
    Origin(OriginResponse),
    Failure(ForwardError),
}

/// Handle one client connection from first read to close.
///
/// Driven by [`ConnectionState`]: each phase runs once, then the state
/// advances until `Closed`.
pub async fn serve_connection<S>(mut stream: S, peer: SocketAddr, context: &ProxyContext)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut state = ConnectionState::Receiving;
    let mut raw = String::new();
    let mut reply = None;

    while state != ConnectionState::Closed {
        match state {
            ConnectionState::Receiving => raw = receive_request(&mut stream, &context.client).await,
            ConnectionState::Processing => reply = Some(process_request(context, peer, &raw).await),
            ConnectionState::Responding => {
                if let Some(reply) = &reply {
                    if let Err(e) = write_reply(&mut stream, reply).await {
                        tracing::debug!(error = %e, "Client went away before the reply was written");
                    }
                }
                if let Err(e) = stream.shutdown().await {
                    tracing::trace!(error = %e, "Client shutdown failed");
                }
            }
            ConnectionState::Closed => {}
        }

        let next = state.next();
        tracing::trace!(from = ?state, to = ?next, "Connection state");
        state = next;
    }
}

async fn process_request(context: &ProxyContext, peer: SocketAddr, raw: &str) -> Reply {
    match process(&context.validator, peer, raw) {
        Ok(request) => respond(context, &request).await,
        Err(error) => {
            metrics::record_request(if error == ErrorResponse::NOT_IMPLEMENTED {
                RequestOutcome::NotImplemented
            } else {
                RequestOutcome::BadRequest
            });
            Reply::Error(error)
        }
    }
}

/// Read until the blank-line terminator, EOF, the read budget, or the deadline.
///
/// Whatever arrived is returned even if the terminator never did.
async fn receive_request<S>(stream: &mut S, config: &ClientConfig) -> String
where
    S: AsyncRead + Unpin,
{
    let mut buffer = Vec::with_capacity(config.read_chunk_size);
    let mut chunk = vec![0u8; config.read_chunk_size];

    let reading = async {
        for _ in 0..config.max_reads {
            match stream.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => {
                    buffer.extend_from_slice(&chunk[..n]);
                    if buffer.windows(TERMINATOR.len()).any(|w| w == TERMINATOR) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Client read failed");
                    break;
                }
            }
        }
    };
    if let Err(e) = with_deadline(config.read_timeout(), reading).await {
        tracing::debug!(error = %e, "Client read deadline expired");
    }

    String::from_utf8_lossy(&buffer).into_owned()
}

async fn respond(context: &ProxyContext, request: &Request) -> Reply {
    let result = match &context.cache {
        Some(cache) => cache
            .get_or_fetch(&request.host, &request.path, || context.forwarder.forward(request))
            .await
            .map(|fetched| {
                metrics::record_cache_lookup(fetched.status);
                tracing::debug!(
                    host = %request.host,
                    path = %request.path,
                    status = ?fetched.status,
                    "Cache lookup"
                );
                let outcome = match fetched.status {
                    CacheStatus::Hit => RequestOutcome::Cached,
                    CacheStatus::Miss => RequestOutcome::Forwarded,
                };
                (fetched.response, outcome)
            }),
        None => context
            .forwarder
            .forward(request)
            .await
            .map(|response| (response, RequestOutcome::Forwarded)),
    };

    match result {
        Ok((response, outcome)) => {
            metrics::record_request(outcome);
            Reply::Origin(response)
        }
        Err(e) => {
            metrics::record_request(RequestOutcome::OriginError);
            Reply::Failure(e)
        }
    }
}

async fn write_reply<S>(stream: &mut S, reply: &Reply) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    match reply {
        Reply::Error(error) => stream.write_all(error.to_wire().as_bytes()).await?,
        Reply::Origin(response) => {
            for chunk in response.chunks() {
                stream.write_all(chunk).await?;
            }
        }
        Reply::Failure(error) => stream.write_all(error.payload()).await?,
    }
    stream.flush().await
}
