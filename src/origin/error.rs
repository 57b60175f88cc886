//! Forwarder failures and their sentinel payloads.

use thiserror::Error;

pub const UNRESOLVED_HOST: &[u8] = b"Unresolved Host";
pub const TIMED_OUT: &[u8] = b"Request took too much time";
pub const CONNECTION_FAILED: &[u8] = b"Origin Connection Failed";

const SENTINELS: [&[u8]; 3] = [UNRESOLVED_HOST, TIMED_OUT, CONNECTION_FAILED];

/// Errors that can occur while forwarding to an origin.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// DNS lookup failed or returned no addresses.
    #[error("could not resolve host {0}")]
    UnresolvedHost(String),

    /// Connect or response read exceeded its deadline.
    #[error("origin {0} timed out")]
    TimedOut(String),

    /// Connect refused, or the connection broke mid-exchange.
    #[error("connection to origin {origin} failed: {source}")]
    Connection {
        origin: String,
        #[source]
        source: std::io::Error,
    },
}

impl ForwardError {
    /// Bytes relayed to the client in place of an origin response.
    pub fn payload(&self) -> &'static [u8] {
        match self {
            ForwardError::UnresolvedHost(_) => UNRESOLVED_HOST,
            ForwardError::TimedOut(_) => TIMED_OUT,
            ForwardError::Connection { .. } => CONNECTION_FAILED,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::UnresolvedHost(_) => "unresolved_host",
            ForwardError::TimedOut(_) => "timed_out",
            ForwardError::Connection { .. } => "connection",
        }
    }
}

/// Whether `bytes` is exactly one of the sentinel payloads.
pub fn is_sentinel(bytes: &[u8]) -> bool {
    SENTINELS.contains(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_are_sentinels() {
        let errors = [
            ForwardError::UnresolvedHost("a.invalid".into()),
            ForwardError::TimedOut("a.com:80".into()),
            ForwardError::Connection {
                origin: "a.com:80".into(),
                source: std::io::ErrorKind::ConnectionRefused.into(),
            },
        ];
        for error in &errors {
            assert!(is_sentinel(error.payload()), "{}", error);
        }
        assert_eq!(errors[0].payload(), b"Unresolved Host");
        assert_eq!(errors[1].payload(), b"Request took too much time");
    }

    #[test]
    fn real_content_is_not_a_sentinel() {
        assert!(!is_sentinel(b"HTTP/1.0 200 OK\r\n\r\n"));
        assert!(!is_sentinel(b"Unresolved Host!"));
        assert!(!is_sentinel(b""));
    }
}
