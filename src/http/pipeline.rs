//! Validate → parse → sanitize.

use std::net::SocketAddr;

use crate::http::parser::parse;
use crate::http::request::Request;
use crate::http::response::ErrorResponse;
use crate::http::sanitizer::sanitize;
use crate::http::validator::{Validator, Verdict};

/// Turn raw client text into a canonical request or the error to send back.
pub fn process(
    validator: &Validator,
    client_address: SocketAddr,
    raw: &str,
) -> Result<Request, ErrorResponse> {
    match validator.validate(raw) {
        Verdict::Good => {}
        Verdict::InvalidInput(reason) => {
            tracing::warn!(client = %client_address, reason = %reason, "Rejecting request");
            return Err(ErrorResponse::BAD_REQUEST);
        }
        Verdict::NotSupported(method) => {
            tracing::warn!(client = %client_address, method = %method, "Method not implemented");
            return Err(ErrorResponse::NOT_IMPLEMENTED);
        }
    }

    let mut request = parse(client_address, raw).map_err(|e| {
        tracing::warn!(client = %client_address, error = %e, "Validated request failed to parse");
        ErrorResponse::BAD_REQUEST
    })?;
    sanitize(&mut request);

    tracing::debug!(
        client = %client_address,
        method = %request.method,
        host = %request.host,
        port = request.port,
        path = %request.path,
        "Request accepted"
    );
    Ok(request)
}
