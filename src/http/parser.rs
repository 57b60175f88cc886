//! Structured parsing of validated request text.

use std::net::SocketAddr;

use thiserror::Error;

use crate::http::authority::{split_authority, DEFAULT_PORT};
use crate::http::request::{Header, Method, Request};

/// Raw text that does not have the shape validation guarantees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("empty request")]
    Empty,

    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("unknown method: {0:?}")]
    UnknownMethod(String),

    #[error("malformed header line: {0:?}")]
    MalformedHeader(String),
}

/// Parse raw request text into a [`Request`].
///
/// Expects text that already passed validation. The target is kept as-is
/// (it may still be an absolute URI); the host comes from the first Host
/// header, with any port suffix moved into `port`.
pub fn parse(client_address: SocketAddr, raw: &str) -> Result<Request, RequestError> {
    let mut lines = raw.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines.next().ok_or(RequestError::Empty)?;

    let tokens: Vec<&str> = request_line.split(' ').collect();
    let &[method, target, _version] = tokens.as_slice() else {
        return Err(RequestError::MalformedRequestLine(request_line.to_string()));
    };
    let method =
        Method::from_token(method).ok_or_else(|| RequestError::UnknownMethod(method.to_string()))?;

    let mut request = Request {
        method,
        client_address,
        host: String::new(),
        port: DEFAULT_PORT,
        path: target.trim().to_string(),
        headers: Vec::new(),
    };

    let mut seen_host = false;
    for line in lines {
        let (name, value) = line
            .split_once(": ")
            .ok_or_else(|| RequestError::MalformedHeader(line.to_string()))?;
        let mut header = Header::new(name.trim(), value.trim());

        if header.is_host() {
            let (host, port) = split_authority(&header.value);
            let host = host.to_string();
            if !seen_host {
                seen_host = true;
                request.host = host.clone();
                request.port = port.or_default();
            }
            header.value = host;
        }
        request.headers.push(header);
    }

    Ok(request)
}
