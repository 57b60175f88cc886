//! Forwarding canonical requests to origin servers.
//!
//! # Responsibilities
//! - Resolve the request host (IPv4 preferred)
//! - Connect under the configured connect timeout
//! - Send the HTTP/1.0 wire form and read until the origin closes
//!
//! # Design Decisions
//! - DNS failure, timeouts and broken connections are distinct errors,
//!   each with its own sentinel payload
//! - The read loop runs under a deadline; expiry counts as a timeout

use std::net::SocketAddr;
use std::time::Instant;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::OriginConfig;
use crate::http::Request;
use crate::observability::metrics;
use crate::origin::error::ForwardError;
use crate::origin::response::OriginResponse;
use crate::resilience::with_deadline;

/// Sends requests to origins over fresh TCP connections.
#[derive(Debug, Clone)]
pub struct OriginForwarder {
    config: OriginConfig,
}

impl OriginForwarder {
    pub fn new(config: OriginConfig) -> Self {
        Self { config }
    }

    /// Forward `request` and buffer the complete response.
    pub async fn forward(&self, request: &Request) -> Result<OriginResponse, ForwardError> {
        let start = Instant::now();
        let origin = format!("{}:{}", request.host, request.port);

        let result = self.exchange(request, &origin).await;
        match &result {
            Ok(response) => {
                metrics::record_origin_fetch(start);
                if response.is_empty() {
                    tracing::warn!(origin = %origin, "Origin closed without sending a response");
                }
                tracing::debug!(
                    origin = %origin,
                    bytes = response.len(),
                    chunks = response.chunks().len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Origin response received"
                );
            }
            Err(e) => {
                metrics::record_origin_failure(e.kind());
                tracing::warn!(origin = %origin, error = %e, "Forwarding failed");
            }
        }
        result
    }

    async fn exchange(&self, request: &Request, origin: &str) -> Result<OriginResponse, ForwardError> {
        let addr = resolve(&request.host, request.port).await?;

        let mut stream = with_deadline(Some(self.config.connect_timeout()), TcpStream::connect(addr))
            .await
            .map_err(|_| ForwardError::TimedOut(origin.to_string()))?
            .map_err(|source| connection_error(origin, source))?;

        tracing::trace!(origin = %origin, addr = %addr, "Connected to origin");

        stream
            .write_all(request.to_wire().as_bytes())
            .await
            .map_err(|source| connection_error(origin, source))?;

        let response = with_deadline(
            self.config.read_timeout(),
            read_to_close(&mut stream, self.config.read_chunk_size),
        )
        .await
        .map_err(|_| ForwardError::TimedOut(origin.to_string()))?
        .map_err(|source| connection_error(origin, source))?;

        if let Err(e) = stream.shutdown().await {
            tracing::trace!(origin = %origin, error = %e, "Origin shutdown failed");
        }
        Ok(response)
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, ForwardError> {
    let unresolved = || ForwardError::UnresolvedHost(host.to_string());

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| unresolved())?
        .collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(unresolved)
}

/// Read fixed-size chunks until a zero-length read.
async fn read_to_close<R>(reader: &mut R, chunk_size: usize) -> std::io::Result<OriginResponse>
where
    R: AsyncRead + Unpin,
{
    let mut chunks = Vec::new();
    let mut buf = vec![0u8; chunk_size];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        chunks.push(Bytes::copy_from_slice(&buf[..n]));
    }
    Ok(OriginResponse::from_chunks(chunks))
}

fn connection_error(origin: &str, source: std::io::Error) -> ForwardError {
    ForwardError::Connection {
        origin: origin.to_string(),
        source,
    }
}
