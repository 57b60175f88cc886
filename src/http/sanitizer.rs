//! Normalization of parsed requests into canonical form.
//!
//! Canonical form: relative path, non-empty host, and exactly one Host
//! header whose value is `host` (plus `:port` when the port is not 80).

use crate::http::authority::{split_absolute_target, split_authority};
use crate::http::request::{Header, Request};

/// Rewrite `request` into canonical form in place. Idempotent.
///
/// An absolute target (`http://host[:port]/rest` or `host[:port]/rest`)
/// is authoritative: its host and port replace whatever a Host header said.
pub fn sanitize(request: &mut Request) {
    if !request.path.starts_with('/') {
        let (authority, rest) = split_absolute_target(&request.path);
        let (host, port) = split_authority(authority);
        let (host, rest) = (host.to_string(), rest.to_string());

        request.host = host;
        request.port = port.or_default();
        request.path = rest;
    }

    if request.host.is_empty() {
        return;
    }
    reconcile_host_header(request);
}

fn reconcile_host_header(request: &mut Request) {
    let expected = request.expected_host_value();

    match request.headers.iter().position(Header::is_host) {
        Some(first) => {
            request.headers[first].value = expected;
            let mut index = 0;
            request.headers.retain(|header| {
                let keep = index == first || !header.is_host();
                index += 1;
                keep
            });
        }
        None => request.headers.insert(0, Header::new("Host", expected)),
    }
}
