//! Host and port extraction shared by validation, parsing and sanitizing.

/// Port used when a request names none.
pub const DEFAULT_PORT: u16 = 80;

/// The port part of a `host[:port]` authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSuffix {
    /// No `:` present.
    Absent,
    /// A `:` followed by a valid port number.
    Valid(u16),
    /// A `:` followed by something that is not a port number.
    Malformed,
}

impl PortSuffix {
    /// Resolve to a concrete port, falling back to [`DEFAULT_PORT`].
    pub fn or_default(self) -> u16 {
        match self {
            PortSuffix::Valid(port) => port,
            PortSuffix::Absent | PortSuffix::Malformed => DEFAULT_PORT,
        }
    }
}

/// Split `host[:port]` on the first `:`.
///
/// Whitespace around either part is ignored so the historical
/// `Host: name: 8080` header shape yields `("name", Valid(8080))`.
pub fn split_authority(authority: &str) -> (&str, PortSuffix) {
    match authority.split_once(':') {
        None => (authority.trim(), PortSuffix::Absent),
        Some((host, port)) => {
            let port = port.trim();
            let suffix = if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
                port.parse().map_or(PortSuffix::Malformed, PortSuffix::Valid)
            } else {
                PortSuffix::Malformed
            };
            (host.trim(), suffix)
        }
    }
}

/// Split an absolute request target into its authority and the path after it.
///
/// Accepts both `scheme://host[:port]/rest` and `host[:port]/rest`. The
/// returned path starts at the first `/` after the authority and is `/`
/// when the target has none.
pub fn split_absolute_target(target: &str) -> (&str, &str) {
    let without_scheme = match target.find("://") {
        Some(idx) => &target[idx + 3..],
        None => target,
    };
    match without_scheme.find('/') {
        Some(idx) => (&without_scheme[..idx], &without_scheme[idx..]),
        None => (without_scheme, "/"),
    }
}
